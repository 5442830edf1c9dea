use crate::domain::RecentRepositories;
use anyhow::Result;
use std::path::Path;

/// Recent-repository store interface
///
/// Single writer: the session is the only caller.
pub trait RecentStore: Send + Sync {
    /// Load the stored list, empty when nothing was stored yet
    fn load(&self) -> Result<RecentRepositories>;

    /// Persist the list, creating the backing location if needed
    fn save(&self, recent: &RecentRepositories) -> Result<()>;

    /// Move `path` to the front of the stored list and persist it
    fn add_path(&self, path: &Path) -> Result<RecentRepositories> {
        let mut recent = self.load()?;
        recent.add(path);
        self.save(&recent)?;
        Ok(recent)
    }
}
