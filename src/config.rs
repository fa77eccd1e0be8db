use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub cf_home: Option<PathBuf>,
    pub skip_ssl_validation: bool,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push("eureka-deregister");
        path.push("config.toml");
        Ok(path)
    }

    /// Apply command line overrides on top of the file settings
    pub fn merge(mut self, overrides: Overrides) -> Self {
        if overrides.cf_home.is_some() {
            self.cf_home = overrides.cf_home;
        }
        if overrides.skip_ssl_validation {
            self.skip_ssl_validation = true;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("eureka-deregister/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Directory holding the CF CLI's `.cf/config.json`
    pub fn cf_home(&self) -> Result<PathBuf> {
        match &self.cf_home {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir().context("Could not find home directory"),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cf_home: Option<PathBuf>,
    pub skip_ssl_validation: bool,
    pub timeout_secs: Option<u64>,
}
