pub mod context;
pub mod session;

pub use context::UserContext;
pub use session::{UserSession, SESSION_COOKIE};
