use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::{database, error::ApiError, AppState};

/// Liveness: if this answers, the process is up
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "photo-archive",
    }))
}

/// Readiness: database reachable (when one is configured) and media root present
pub async fn readiness_check(State(app_state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let database = match &app_state.db_pool {
        Some(pool) => match database::health_check(pool).await {
            Ok(()) => json!({ "healthy": true, "message": "Database connection successful" }),
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                json!({ "healthy": false, "message": "Database connection failed" })
            }
        },
        None => json!({ "healthy": true, "message": "In-memory store" }),
    };

    let media_ready = tokio::fs::metadata(app_state.storage.root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let storage = json!({ "healthy": media_ready });

    let ready = database["healthy"].as_bool().unwrap_or(false) && media_ready;
    if !ready {
        tracing::warn!(database = %database, storage = %storage, "service not ready");
        return Err(ApiError::internal("Service is not ready"));
    }

    Ok(Json(json!({
        "ready": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "checks": {
            "database": database,
            "storage": storage,
        }
    })))
}
