pub mod commands;
pub mod selection;

pub use commands::*;
pub use selection::*;
