pub mod document;
pub mod search;
pub mod search_log;

// Re-export commonly used types
pub use document::*;
pub use search::*;
pub use search_log::*;
