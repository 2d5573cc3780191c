pub mod admin_handlers;
pub mod auth_handlers;
pub mod document_handlers;
pub mod extract;
pub mod health_handlers;
pub mod home_handlers;
pub mod search_handlers;
pub mod static_handlers;

pub use extract::DocumentId;
pub use health_handlers::{health_check, readiness_check};
pub use static_handlers::serve_thumbnail;
