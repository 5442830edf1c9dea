use anyhow::{Context, Result};
use lgit_core::domain::RecentRepositories;
use lgit_core::ports::RecentStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default location of the recent list, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = ".tmp/data.json";

/// JSON file store for the recent-repository list: `{"recent": [...]}`
pub struct FileRecentStore {
    data_path: PathBuf,
}

impl FileRecentStore {
    pub fn with_path<P: AsRef<Path>>(data_path: P) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.data_path
    }
}

impl RecentStore for FileRecentStore {
    /// A document that does not parse loads as empty, so the next save
    /// replaces it.
    fn load(&self) -> Result<RecentRepositories> {
        if !self.data_path.exists() {
            return Ok(RecentRepositories::default());
        }

        let contents = fs::read_to_string(&self.data_path)
            .with_context(|| format!("Failed to read data file: {}", self.data_path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(recent) => Ok(recent),
            Err(e) => {
                warn!(
                    "Discarding unreadable data file {}: {}",
                    self.data_path.display(),
                    e
                );
                Ok(RecentRepositories::default())
            }
        }
    }

    fn save(&self, recent: &RecentRepositories) -> Result<()> {
        if let Some(parent) = self.data_path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let contents =
            serde_json::to_string(recent).context("Failed to serialize recent repositories")?;

        fs::write(&self.data_path, contents)
            .with_context(|| format!("Failed to write data file: {}", self.data_path.display()))
    }
}
