pub mod auth_service;
pub mod document_service;
pub mod moderation_service;
pub mod search_service;
pub mod storage;
pub mod thumbnail_service;

// Re-export commonly used types
pub use auth_service::AuthService;
pub use document_service::DocumentService;
pub use moderation_service::{Dashboard, DeletePreview, DocumentCounts, ModerationService};
pub use search_service::{Page, Paginator, SearchHit, SearchResults, SearchService};
pub use storage::{BlobStorage, Namespace};
pub use thumbnail_service::{ThumbnailGenerator, ThumbnailOutcome};
