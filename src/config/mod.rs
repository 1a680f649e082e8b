//! Configuration management
//!
//! Settings live in `~/.copycache/config.yaml`. A missing file means all
//! defaults. Set `COPYCACHE_HOME` to relocate the whole data directory
//! (config, database, daemon state).

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::HistoryConfig;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "COPYCACHE_HOME";

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "theme",
    "blacklist",
    "history.capacity",
    "history.merge_duplicates",
];

/// Returns the directory holding all copycache state.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".copycache");
    Ok(dir)
}

/// Popup color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => bail!("Unknown theme '{other}' (expected 'dark' or 'light')"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Popup theme
    pub theme: Theme,

    /// Source host patterns whose copies are never recorded
    pub blacklist: Vec<String>,

    /// History limits
    pub history: HistoryConfig,
}

impl Config {
    /// Loads the config file, falling back to defaults if it doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse {}: {e}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let yaml = serde_saphyr::to_string(self)
            .map_err(|e| anyhow!("Failed to serialize config: {e}"))?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.yaml"))
    }

    /// Reads a setting by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "theme" => Some(self.theme.to_string()),
            "blacklist" => Some(self.blacklist.join(",")),
            "history.capacity" => Some(self.history.capacity.to_string()),
            "history.merge_duplicates" => Some(self.history.merge_duplicates.to_string()),
            _ => None,
        }
    }

    /// Updates a setting by dotted key.
    ///
    /// `blacklist` takes a comma-separated list and replaces the current one.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => self.theme = value.parse()?,
            "blacklist" => {
                self.blacklist = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            "history.capacity" => {
                self.history.capacity = value
                    .parse()
                    .with_context(|| format!("Invalid capacity '{value}'"))?;
            }
            "history.merge_duplicates" => {
                self.history.merge_duplicates = value
                    .parse()
                    .with_context(|| format!("Invalid boolean '{value}'"))?;
            }
            _ => bail!(
                "Unknown config key '{key}'. Valid keys: {}",
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Adds a blacklist pattern. Returns false if it was already present.
    pub fn add_to_blacklist(&mut self, pattern: &str) -> bool {
        if self.blacklist.iter().any(|p| p == pattern) {
            return false;
        }
        self.blacklist.push(pattern.to_string());
        true
    }

    /// Removes a blacklist pattern. Returns false if it wasn't present.
    pub fn remove_from_blacklist(&mut self, pattern: &str) -> bool {
        let before = self.blacklist.len();
        self.blacklist.retain(|p| p != pattern);
        self.blacklist.len() != before
    }
}
