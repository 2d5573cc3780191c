use anyhow::Context;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// HTTP trace layer; spans and responses at DEBUG
pub fn create_logging_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG))
}

/// Logs every request with a correlation id and its duration
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start_time = Instant::now();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        user_agent = %user_agent,
        "incoming request"
    );

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis(),
            "request failed"
        );
    } else {
        tracing::info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = duration.as_millis(),
            "request completed"
        );
    }

    response
}

pub fn parse_level(log_level: &str) -> Option<Level> {
    match log_level.to_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" | "WARNING" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// The configured level applies to this crate; dependencies stay quieter.
pub fn filter_directives(level: Level) -> String {
    format!("photo_archive={},tower_http=info,sqlx=warn", level)
}

/// Initialize structured logging in JSON or plain format
pub fn init_logging(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    let level = parse_level(log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', defaulting to INFO", log_level);
        Level::INFO
    });

    let env_filter = tracing_subscriber::EnvFilter::new(filter_directives(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match log_format.to_lowercase().as_str() {
        "plain" | "text" => {
            let plain_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true);

            subscriber
                .with(plain_layer)
                .try_init()
                .context("failed to install plain log subscriber")?;
        }
        _ => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true);

            subscriber
                .with(json_layer)
                .try_init()
                .context("failed to install JSON log subscriber")?;
        }
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        "logging initialized"
    );

    Ok(())
}
