//! lgit core - pure domain logic with no git or filesystem dependencies
//!
//! This crate holds the command vocabulary, the records exchanged with a
//! repository session, the wire envelopes, the ports (interfaces) that
//! adapters implement, and the client-side selection state machine.

pub mod app;
pub mod domain;
pub mod error;
pub mod ports;
pub mod protocol;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
