pub mod session;
pub mod session_service;

pub use session::RepositorySession;
pub use session_service::{SessionHandle, SessionService};
