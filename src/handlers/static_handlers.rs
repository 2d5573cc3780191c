use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::{
    error::ApiError,
    services::storage::{is_plain_file_name, Namespace},
    AppState,
};

/// Serves a generated thumbnail. Names must be a single plain path component.
pub async fn serve_thumbnail(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if !is_plain_file_name(&name) {
        tracing::warn!(requested = %name, "rejected thumbnail path");
        return Err(ApiError::not_found("File not found"));
    }

    let key = format!("{}/{}", Namespace::Thumbnails.dir(), name);
    let bytes = app_state.storage.read(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400"),
            ),
        ],
        bytes,
    )
        .into_response())
}
