use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::ApiError, models::DocumentView, AppState};

/// Most recent active documents plus the fields the search form accepts
pub async fn home(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let documents = state
        .document_service
        .recent(state.config.home_recent_limit)
        .await?;

    let recent: Vec<DocumentView> = documents.iter().map(DocumentView::from).collect();

    Ok(Json(json!({
        "recent_documents": recent,
        "search": {
            "action": "/search/",
            "fields": ["query", "date_from", "date_to"],
        },
    })))
}
