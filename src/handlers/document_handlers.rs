use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;

use crate::{
    auth::UserContext,
    error::ApiError,
    handlers::DocumentId,
    forms::DocumentForm,
    models::DocumentView,
    AppState,
};

pub async fn get_document(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> Result<Json<DocumentView>, ApiError> {
    let document = state.document_service.get_active(id).await?;
    Ok(Json(DocumentView::from(document)))
}

/// Describes the upload form: field names, type choices and the size limit
pub async fn add_document_form(State(state): State<AppState>) -> Json<Value> {
    Json(DocumentForm::describe(state.config.max_upload_bytes))
}

/// Multipart upload. Every invalid field is reported in one `400` response.
pub async fn add_document(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = DocumentForm::from_multipart(multipart).await?;
    let validated = form
        .validate(state.config.max_upload_bytes)
        .map_err(ApiError::Form)?;

    let document = state.document_service.create(validated).await?;

    tracing::info!(
        document_id = document.id,
        user_id = user.user_id,
        "document uploaded"
    );

    let location = document.detail_url();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(DocumentView::from(document)),
    )
        .into_response())
}

pub async fn download_document(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    DocumentId(id): DocumentId,
) -> Result<Response, ApiError> {
    let document = state.document_service.get_active(id).await?;
    let (file_name, bytes) = state.document_service.read_file(&document).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| ApiError::internal(format!("Invalid download file name: {}", e)))?;

    tracing::info!(
        document_id = id,
        user_id = user.user_id,
        file_size = bytes.len(),
        "serving document download"
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
