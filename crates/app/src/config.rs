use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::{GitOptions, DEFAULT_DATA_FILE};
use crate::cli::CliArgs;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub version: u32,
    /// Recent-repository list; relative paths are taken from the working directory
    pub data_file: PathBuf,
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct RepositoryConfig {
    /// Branch the history is read from; master, then main, then HEAD when unset
    #[serde(default)]
    pub primary_branch: Option<String>,
    #[serde(default)]
    pub include_ignored: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LogConfig {
    /// `tracing` filter directive, used when RUST_LOG is not set
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            repository: RepositoryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// `lgit.toml` in the platform config directory
pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", "lgit").context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("lgit.toml"))
}

impl Config {
    /// Read the config file, writing out the defaults first if it does not exist yet
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn from_cli_and_file(cli_args: &CliArgs, config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        // CLI args override config file
        if let Some(data_file) = &cli_args.data_file {
            config.data_file = data_file.clone();
        }

        Ok(config)
    }

    /// Absolute location of the recent list
    pub fn data_file_path(&self, cwd: &Path) -> PathBuf {
        if self.data_file.is_absolute() {
            self.data_file.clone()
        } else {
            cwd.join(&self.data_file)
        }
    }

    pub fn git_options(&self) -> GitOptions {
        GitOptions {
            primary_branch: self.repository.primary_branch.clone(),
            include_ignored: self.repository.include_ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.data_file, PathBuf::from(".tmp/data.json"));
        assert_eq!(config.repository.primary_branch, None);
        assert!(!config.repository.include_ignored);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_config_serialization_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.repository.primary_branch = Some("trunk".to_string());
        config.log.filter = "lgit=debug".to_string();

        let toml_str = toml::to_string_pretty(&config)?;
        let parsed_config: Config = toml::from_str(&toml_str)?;

        assert_eq!(config, parsed_config);
        Ok(())
    }

    #[test]
    fn test_config_sections_are_optional() -> Result<()> {
        let config: Config = toml::from_str("version = 1\ndata_file = \"recent.json\"\n")?;
        assert_eq!(config.repository, RepositoryConfig::default());
        assert_eq!(config.log, LogConfig::default());
        Ok(())
    }

    #[test]
    fn test_config_load_nonexistent_creates_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("lgit.toml");

        let config = Config::load(Some(config_path.clone()))?;

        assert_eq!(config, Config::default());
        assert!(config_path.exists());
        Ok(())
    }

    #[test]
    fn test_config_load_invalid_toml() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "version = [")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn test_cli_data_file_overrides_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("lgit.toml");
        let cli_args = CliArgs::parse_from(["lgit", "--data-file", "/var/lgit/recent.json"]);

        let config = Config::from_cli_and_file(&cli_args, Some(config_path))?;
        assert_eq!(config.data_file, PathBuf::from("/var/lgit/recent.json"));
        Ok(())
    }

    #[test]
    fn test_data_file_path_resolution() {
        let mut config = Config::default();
        assert_eq!(
            config.data_file_path(Path::new("/work")),
            PathBuf::from("/work/.tmp/data.json")
        );

        config.data_file = PathBuf::from("/abs/data.json");
        assert_eq!(config.data_file_path(Path::new("/work")), PathBuf::from("/abs/data.json"));
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("lgit.toml"));
        Ok(())
    }
}
