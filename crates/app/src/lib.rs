//! lgit application library
//!
//! Adapters for git and the recent-repository file, the session service that
//! runs commands in order, the client model, and the stdio transport.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod services;
pub mod transport;
