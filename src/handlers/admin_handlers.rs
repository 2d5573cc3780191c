use axum::{
    extract::{Extension, State},
    response::Redirect,
    Form, Json,
};

use crate::{
    auth::UserContext,
    error::ApiError,
    handlers::DocumentId,
    forms::DocumentEditForm,
    models::DocumentView,
    services::{Dashboard, DeletePreview},
    AppState,
};

pub const DASHBOARD_PATH: &str = "/admin/dashboard/";

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = state.moderation_service.dashboard().await?;
    Ok(Json(dashboard))
}

pub async fn toggle_document(
    Extension(context): Extension<UserContext>,
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> Result<Redirect, ApiError> {
    let document = state.moderation_service.toggle(id).await?;
    tracing::info!(
        document_id = id,
        is_active = document.is_active,
        moderator = %context.username,
        "moderation: toggle"
    );
    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Confirmation view; nothing is removed on GET.
pub async fn delete_document_preview(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> Result<Json<DeletePreview>, ApiError> {
    let preview = state.moderation_service.delete_preview(id).await?;
    Ok(Json(preview))
}

pub async fn delete_document(
    Extension(context): Extension<UserContext>,
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> Result<Redirect, ApiError> {
    state.moderation_service.delete(id).await?;
    tracing::info!(
        document_id = id,
        moderator = %context.username,
        "moderation: delete"
    );
    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Current values of any document, active or not
pub async fn edit_document_form(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> Result<Json<DocumentView>, ApiError> {
    let document = state.document_service.get(id).await?;
    Ok(Json(DocumentView::from(document)))
}

pub async fn edit_document(
    Extension(context): Extension<UserContext>,
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
    Form(form): Form<DocumentEditForm>,
) -> Result<Redirect, ApiError> {
    // 404 before validation so an unknown id never reports field errors
    state.document_service.get(id).await?;

    let update = form.validate().map_err(ApiError::Form)?;
    state.document_service.update(id, update).await?;

    tracing::info!(
        document_id = id,
        moderator = %context.username,
        "moderation: edit"
    );
    Ok(Redirect::to(DASHBOARD_PATH))
}
