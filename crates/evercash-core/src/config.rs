//! Application configuration management.
//!
//! Configuration is stored at `~/.config/evercash/config.json` (a missing
//! file means defaults). Environment variables override the file after it
//! is loaded:
//!
//! - `EVERCASH_API_BASE_URL`, `EVERCASH_AUTH_URL`, `EVERCASH_AUTH_ANON_KEY`
//! - `EVERCASH_CACHE_TTL_MS`, `EVERCASH_VERIFY_ON_INIT`
//! - `EVERCASH_USE_KEYRING`, `EVERCASH_LOG_DIR`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
const APP_NAME: &str = "evercash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default backend.
const DEFAULT_API_BASE_URL: &str = "https://api.evercash.in";

/// Default response cache TTL in milliseconds.
/// 3 minutes keeps lists snappy without hiding other devices' edits for long.
const DEFAULT_CACHE_TTL_MS: u64 = 180_000;

/// Cache TTLs below this are raised to it.
const MIN_CACHE_TTL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_url: Option<String>,
    pub auth_anon_key: Option<String>,
    pub cache_ttl_ms: u64,
    pub verify_on_init: bool,
    pub use_keyring: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: None,
            auth_anon_key: None,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            verify_on_init: true,
            use_keyring: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from `lookup` (normally the process environment).
    /// Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("EVERCASH_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = var("EVERCASH_AUTH_URL") {
            self.auth_url = Some(url);
        }
        if let Some(key) = var("EVERCASH_AUTH_ANON_KEY") {
            self.auth_anon_key = Some(key);
        }
        if let Some(raw) = var("EVERCASH_CACHE_TTL_MS") {
            match raw.trim().parse() {
                Ok(ms) => self.cache_ttl_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid EVERCASH_CACHE_TTL_MS"),
            }
        }
        if let Some(raw) = var("EVERCASH_VERIFY_ON_INIT") {
            match parse_bool(&raw) {
                Some(flag) => self.verify_on_init = flag,
                None => warn!(value = %raw, "Ignoring invalid EVERCASH_VERIFY_ON_INIT"),
            }
        }
        if let Some(raw) = var("EVERCASH_USE_KEYRING") {
            match parse_bool(&raw) {
                Some(flag) => self.use_keyring = flag,
                None => warn!(value = %raw, "Ignoring invalid EVERCASH_USE_KEYRING"),
            }
        }
        if let Some(dir) = var("EVERCASH_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms.max(MIN_CACHE_TTL_MS))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for file-backed storage.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
