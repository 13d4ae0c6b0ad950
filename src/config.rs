//! Configuration management for sysdialog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an extra helper to probe before the defaults.
pub const HELPER_ENV: &str = "SYSDIALOG_HELPER";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Backend discovery
    pub backend: BackendConfig,
    /// Command-line front-end defaults
    pub cli: CliConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// zenity-compatible helpers, probed in order on Unix desktops
    pub helpers: Vec<String>,
    /// Scripting host on macOS
    pub script_host: String,
    /// PowerShell executable on Windows
    pub powershell: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Output separator for multiple selections
    pub separator: String,
    /// Default dialog timeout in seconds (0 = none)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            helpers: vec![
                "zenity".to_string(),
                "matedialog".to_string(),
                "qarma".to_string(),
            ],
            script_host: "osascript".to_string(),
            powershell: "powershell.exe".to_string(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            separator: "|".to_string(),
            timeout_secs: 0,
        }
    }
}

impl BackendConfig {
    /// Put the helper named by `SYSDIALOG_HELPER` (if any) first in line.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(helper) = std::env::var_os(HELPER_ENV) {
            let helper = helper.to_string_lossy().into_owned();
            if !helper.is_empty() {
                self.helpers.retain(|h| *h != helper);
                self.helpers.insert(0, helper);
            }
        }
        self
    }
}

impl Config {
    /// Get default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sysdialog")
            .join("config.toml")
    }

    /// Load configuration from file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };

        config.backend = config.backend.with_env_overrides();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.cli, CliConfig::default());
        assert!(config.backend.helpers.ends_with(&[
            "zenity".to_string(),
            "matedialog".to_string(),
            "qarma".to_string()
        ]));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cli]\nseparator = \";\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.cli.separator, ";");
        assert_eq!(config.cli.timeout_secs, 0);
        assert_eq!(config.backend.script_host, "osascript");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.cli.timeout_secs = 30;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.cli.timeout_secs, 30);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cli\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
