//! Configuration management for pscan CLI

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Decoder nesting limit
    pub max_depth: Option<usize>,
    /// Default output format for decoded ViewStates
    pub format: Option<OutputFormat>,
    /// Indent rendered objects
    pub pretty: Option<bool>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("pscan");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Effective nesting limit, with a command-line override taking precedence
    pub fn max_depth(&self, flag: Option<usize>) -> usize {
        flag.or(self.max_depth).unwrap_or(viewstate::DEFAULT_MAX_DEPTH)
    }

    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.format).unwrap_or_default()
    }

    pub fn pretty(&self, flag: Option<bool>) -> bool {
        flag.or(self.pretty).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_depth(None), viewstate::DEFAULT_MAX_DEPTH);
        assert_eq!(config.format(None), OutputFormat::Xml);
        assert!(config.pretty(None));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            max_depth: Some(16),
            format: Some(OutputFormat::Json),
            pretty: Some(false),
        };
        config.save_to(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("max_depth = 16"));
        assert!(contents.contains("format = \"json\""));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            max_depth: Some(8),
            format: Some(OutputFormat::Json),
            pretty: Some(false),
        };
        assert_eq!(config.max_depth(None), 8);
        assert_eq!(config.max_depth(Some(3)), 3);
        assert_eq!(config.format(Some(OutputFormat::Xml)), OutputFormat::Xml);
        assert!(config.pretty(Some(true)));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_depth = \"lots\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        if let Ok(path) = path {
            assert!(path.ends_with("pscan/config.toml"));
        }
    }
}
