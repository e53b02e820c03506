use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::Coordinates,
    provider::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "SKYGLASS_API_KEY";

/// Fallback position used when no coordinates are given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [home]
/// latitude = 59.91
/// longitude = 10.75
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    /// Override for the provider host, mostly for testing.
    pub base_url: Option<String>,

    pub timeout_secs: Option<u64>,

    pub home: Option<HomeLocation>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to {}", path.display());

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyglass", "skyglass")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API key. Blank input clears it.
    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn set_home(&mut self, coordinates: Option<Coordinates>) {
        self.home = coordinates.map(|c| HomeLocation {
            latitude: c.latitude,
            longitude: c.longitude,
        });
    }

    /// API key from the environment if set, else from the file.
    pub fn resolved_api_key(&self) -> Option<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn has_api_key(&self) -> bool {
        self.resolved_api_key().is_some()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn home_coordinates(&self) -> Option<Coordinates> {
        self.home
            .map(|home| Coordinates::new(home.latitude, home.longitude))
    }
}

fn pick_api_key(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.into_iter()
        .map(|k| k.trim().to_string())
        .chain(file.map(|k| k.trim().to_string()))
        .find(|k| !k.is_empty())
}
