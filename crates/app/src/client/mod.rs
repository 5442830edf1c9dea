//! Front-end state for a repository session, in model/update form.

pub mod model;
pub mod session_client;
pub mod update;

pub use model::{ChangeContext, ClientModel, Comparison};
pub use session_client::SessionClient;
pub use update::{ClientMessage, ClientUpdate};
