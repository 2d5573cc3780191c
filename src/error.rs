use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::forms::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid form submission: {0}")]
    Form(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Carries the login location (including `next`) the client is sent to.
    #[error("Login required: {0}")]
    LoginRequired(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new authentication error
    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new authorization error
    pub fn authorization<T: Into<String>>(msg: T) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, error_message, error_code) = match self {
            ApiError::LoginRequired(location) => {
                tracing::debug!(
                    error_id = %error_id,
                    location = %location,
                    "login required, redirecting"
                );
                return (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response();
            }
            ApiError::Form(errors) => {
                tracing::warn!(
                    error_id = %error_id,
                    fields = ?errors.field_names(),
                    "form validation failed"
                );
                let body = Json(json!({
                    "error": {
                        "message": "Invalid form submission",
                        "code": "VALIDATION_ERROR",
                        "fields": errors,
                        "error_id": error_id,
                        "timestamp": chrono::Utc::now().to_rfc3339(),
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::Database(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "database error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::Validation(msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "validation error occurred"
                );
                (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR")
            }
            ApiError::NotFound(msg) => {
                tracing::info!(
                    error_id = %error_id,
                    error = %msg,
                    "resource not found"
                );
                (StatusCode::NOT_FOUND, msg, "NOT_FOUND")
            }
            ApiError::Config(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "configuration error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    "CONFIG_ERROR",
                )
            }
            ApiError::Configuration(ref msg) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %msg,
                    "configuration error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    "CONFIG_ERROR",
                )
            }
            ApiError::Io(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "IO error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO error".to_string(),
                    "IO_ERROR",
                )
            }
            ApiError::Serialization(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "serialization error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Serialization error".to_string(),
                    "SERIALIZATION_ERROR",
                )
            }
            ApiError::Migration(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "database migration error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database migration error".to_string(),
                    "MIGRATION_ERROR",
                )
            }
            ApiError::Authentication(msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "authentication error occurred"
                );
                (StatusCode::UNAUTHORIZED, msg, "AUTHENTICATION_ERROR")
            }
            ApiError::Authorization(msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "authorization error occurred"
                );
                (StatusCode::FORBIDDEN, msg, "AUTHORIZATION_ERROR")
            }
            ApiError::Internal(ref msg) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %msg,
                    "internal server error occurred"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": error_code,
                "error_id": error_id,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn test_error_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::validation("Test validation error"))
    }

    async fn test_not_found_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::not_found("Resource not found"))
    }

    async fn test_internal_error_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::internal("Internal server error"))
    }

    async fn test_login_required_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::LoginRequired("/auth/login/?next=%2Fdocument%2Fadd%2F".to_string()))
    }

    async fn test_form_error_handler() -> Result<&'static str, ApiError> {
        let mut errors = FieldErrors::default();
        errors.add("title", "This field is required.");
        Err(ApiError::Form(errors))
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let app = Router::new().route("/test", get(test_error_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let app = Router::new().route("/test", get(test_not_found_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let app = Router::new().route("/test", get(test_internal_error_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_login_required_redirects() {
        let app = Router::new().route("/test", get(test_login_required_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=%2Fdocument%2Fadd%2F"
        );
    }

    #[tokio::test]
    async fn test_form_error_lists_fields() {
        let app = Router::new().route("/test", get(test_form_error_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(value["error"]["fields"]["title"][0], "This field is required.");
    }

    #[test]
    fn test_error_constructors() {
        let validation_err = ApiError::validation("test");
        assert!(matches!(validation_err, ApiError::Validation(_)));

        let not_found_err = ApiError::not_found("test");
        assert!(not_found_err.is_not_found());

        let internal_err = ApiError::internal("test");
        assert!(matches!(internal_err, ApiError::Internal(_)));

        let auth_err = ApiError::authentication("test");
        assert!(matches!(auth_err, ApiError::Authentication(_)));

        let authz_err = ApiError::authorization("test");
        assert!(matches!(authz_err, ApiError::Authorization(_)));
    }
}
