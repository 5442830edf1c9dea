//! Client-side selection of commits and files.
//!
//! Tracks up to two selected commits and a set of selected files, and turns
//! clicks into the next command worth sending to the session.

use crate::app::commands::Command;
use crate::domain::CommitRecord;

/// How an item was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Click {
    #[default]
    Plain,
    /// Clicked with the multi-select modifier held
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub current_commit: Option<String>,
    pub next_commit: Option<String>,
    pub selected_files: Vec<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click on a commit in the log.
    ///
    /// A plain click selects the commit alone and asks for its changes. A
    /// modified click toggles it in or out of the (current, next) pair and asks
    /// for the diff between them once both are set.
    pub fn click_commit(&mut self, sha: &str, click: Click) -> Option<Command> {
        match click {
            Click::Plain => {
                self.current_commit = Some(sha.to_string());
                self.next_commit = None;
                Some(Command::changes(sha))
            }
            Click::Modified => {
                if self.current_commit.as_deref() == Some(sha) {
                    self.current_commit = None;
                } else if self.next_commit.as_deref() == Some(sha) {
                    self.next_commit = None;
                } else if self.current_commit.is_none() {
                    self.current_commit = Some(sha.to_string());
                } else {
                    self.next_commit = Some(sha.to_string());
                }

                match (&self.current_commit, &self.next_commit) {
                    (Some(current), Some(next)) => Some(Command::diff(current.as_str(), next.as_str())),
                    _ => None,
                }
            }
        }
    }

    /// Click on a file inside a commit's change list.
    ///
    /// The new side is the current commit. The old side is the next commit
    /// when one is selected, otherwise the commit listed right after the
    /// current one in `log` (its ancestor). A root commit has no old side.
    pub fn click_commit_file(&self, path: &str, log: &[CommitRecord]) -> Option<Command> {
        let current = self.current_commit.as_deref()?;
        let old = match self.next_commit.as_deref() {
            Some(next) => Some(next),
            None => previous_commit(log, current),
        };
        Some(Command::compare(path, Some(current), old))
    }

    /// Click on a file in the working-tree status list.
    ///
    /// A modified click toggles the file in the selection without sending
    /// anything. A plain click selects only that file and compares HEAD with
    /// the working tree.
    pub fn click_status_file(&mut self, path: &str, click: Click) -> Option<Command> {
        match click {
            Click::Modified => {
                if let Some(pos) = self.selected_files.iter().position(|f| f == path) {
                    self.selected_files.remove(pos);
                } else {
                    self.selected_files.push(path.to_string());
                }
                None
            }
            Click::Plain => {
                self.selected_files = vec![path.to_string()];
                Some(Command::compare(path, None, None))
            }
        }
    }

    pub fn is_file_selected(&self, path: &str) -> bool {
        self.selected_files.iter().any(|f| f == path)
    }

    /// Clear everything, e.g. when focus leaves the log area
    pub fn reset(&mut self) {
        self.current_commit = None;
        self.next_commit = None;
        self.selected_files.clear();
    }

    /// Drop commit selections that are no longer in `log`
    pub fn retain_commits_in(&mut self, log: &[CommitRecord]) {
        let known = |sha: &Option<String>| {
            sha.as_deref()
                .is_some_and(|sha| log.iter().any(|c| c.sha == sha))
        };
        if !known(&self.current_commit) {
            self.current_commit = None;
        }
        if !known(&self.next_commit) {
            self.next_commit = None;
        }
    }
}

/// The commit listed right after `sha` in traversal order
pub fn previous_commit<'a>(log: &'a [CommitRecord], sha: &str) -> Option<&'a str> {
    let pos = log.iter().position(|c| c.sha == sha)?;
    log.get(pos + 1).map(|c| c.sha.as_str())
}
