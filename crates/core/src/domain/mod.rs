pub mod commit;
pub mod outcome;
pub mod recent;
pub mod status;

// Re-exports for convenience
pub use commit::*;
pub use outcome::*;
pub use recent::*;
pub use status::*;
