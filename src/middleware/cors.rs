use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// CORS layer for the configured origins. `*` or an empty list mirrors the request origin.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed_headers = [
        HeaderName::from_static("content-type"),
        HeaderName::from_static("x-requested-with"),
    ];

    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(allowed_headers)
        .allow_credentials(true);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        tracing::debug!("CORS: mirroring request origin");
        return base.allow_origin(AllowOrigin::mirror_request());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: no valid origins configured, cross-origin requests are refused");
        return base.allow_origin(AllowOrigin::list(Vec::new()));
    }

    base.allow_origin(origins)
}
