use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Previously opened repositories, most recent first.
///
/// This is also the persisted document: a single `recent` field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecentRepositories {
    #[serde(default)]
    recent: Vec<PathBuf>,
}

impl RecentRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `path` to the front, dropping any existing equal entry.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.recent.retain(|p| p != &path);
        self.recent.insert(0, path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.recent
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.recent.iter().any(|p| p == path)
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }
}

impl FromIterator<PathBuf> for RecentRepositories {
    /// Builds the list in iteration order, keeping the first occurrence of
    /// each path.
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let mut recent: Vec<PathBuf> = Vec::new();
        for path in iter {
            if !recent.contains(&path) {
                recent.push(path);
            }
        }
        Self { recent }
    }
}
