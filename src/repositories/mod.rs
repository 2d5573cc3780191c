pub mod document_repo;
pub mod memory;
pub mod search_log_repo;
pub mod user_repo;

pub use document_repo::{DocumentRepository, SqlxDocumentRepository};
pub use memory::{InMemoryDocumentRepository, InMemorySearchLogRepository, InMemoryUserRepository};
pub use search_log_repo::{SearchLogRepository, SqlxSearchLogRepository};
pub use user_repo::{SqlxUserRepository, User, UserCreate, UserRepository};
