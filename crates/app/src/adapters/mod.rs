pub mod git;
pub mod persistence;

pub use git::{GitAdapter, GitOptions, GitRepositoryHandle};
pub use persistence::{FileRecentStore, DEFAULT_DATA_FILE};
