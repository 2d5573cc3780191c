use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// Numeric `:id` route segment. A segment that is not an integer is a 404, like an unknown id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for DocumentId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(DocumentId(id)),
            Err(rejection) => Err(ApiError::not_found(format!(
                "Document not found: {}",
                rejection.body_text()
            ))),
        }
    }
}
