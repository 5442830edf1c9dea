pub mod persistence;
pub mod vcs;

// Re-exports
pub use persistence::*;
pub use vcs::*;
