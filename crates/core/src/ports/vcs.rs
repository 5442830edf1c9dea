use crate::domain::{CommitRecord, FileStatusEntry};
use anyhow::Result;
use std::path::Path;

/// A revision to read file content from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// The commit HEAD currently points at
    Head,
    /// Any revision spec the provider can resolve to a commit
    Commit(String),
}

/// Port for opening repositories
pub trait VcsProvider: Send + Sync {
    /// Open the repository rooted at `path`
    fn open(&self, path: &Path) -> Result<Box<dyn RepositoryHandle>>;
}

/// Port for operations on one open repository
///
/// Handles are owned by exactly one session and used from one thread at a
/// time, so they only need to be `Send`.
pub trait RepositoryHandle: Send {
    /// Canonical absolute path of the repository
    fn path(&self) -> &Path;

    /// Working tree and index status, in provider enumeration order
    fn status(&self) -> Result<Vec<FileStatusEntry>>;

    /// Files changed by a commit relative to its first parent
    fn commit_changes(&self, sha: &str) -> Result<Vec<FileStatusEntry>>;

    /// Tree diff moving from `old_sha` to `new_sha`
    fn diff_commits(&self, new_sha: &str, old_sha: &str) -> Result<Vec<FileStatusEntry>>;

    /// Full history from the primary branch tip, newest first
    fn history(&self) -> Result<Vec<CommitRecord>>;

    /// Add `paths` to the index, write it and return the written tree id.
    /// Either every path is staged or the on-disk index is left untouched.
    fn stage(&mut self, paths: &[&str]) -> Result<String>;

    /// Commit the index on top of HEAD and return the new commit id
    fn commit(&mut self, message: &str) -> Result<String>;

    /// File content at `revision`; `Ok(None)` when the path does not exist
    /// there. Errors only when the revision itself cannot be resolved.
    fn file_at(&self, revision: &Revision, path: &str) -> Result<Option<String>>;

    /// Working tree file content, `None` when it cannot be read
    fn working_file(&self, path: &str) -> Option<String>;
}
