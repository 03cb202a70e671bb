//! Configuration management.
//!
//! Configuration is read from `~/.config/freshet/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. An explicit `--config` path must already exist.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::scrape::ScrapeConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub refresh: RefreshConfig,
    pub scrape: ScrapeConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Shared secret required by the /feed routes
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_key: String::new(),
        }
    }
}

/// Scheduled refresh settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Refresh cadence, e.g. "6h", "30m", "1d"
    pub interval: String,
    /// Refresh immediately on startup
    pub refresh_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: "6h".to_string(),
            refresh_on_start: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            // Create default config with comments
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/freshet/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("freshet").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Freshet Configuration
#
# The server refuses to start until server.api_key is set. Every /feed
# route requires it as a `key` query parameter.

[server]
# Address to bind
host = "0.0.0.0"
port = 8080

# Shared secret for the /feed routes (required)
api_key = ""

[refresh]
# How often to refresh the cached feed ("6h", "30m", "1d", or raw seconds)
interval = "6h"

# Refresh immediately on startup
refresh_on_start = true

[scrape]
# Page to scrape
feed_url = "https://music.youtube.com"

# Run the browser without a visible window
headless = true

# Stop loading once this many rows are present (0 = load everything)
row_cap = 10

# Wait after each scroll for new rows to render (milliseconds)
scroll_delay_ms = 500

# Timeout for navigations and in-page evaluations (seconds)
nav_timeout_secs = 10

# Browser profile directory holding the logged-in session. Without one a
# throwaway profile is used, which sees the signed-out page.
#user_data_dir = "/home/user/.config/freshet/profile"

# User agent reported to the site
#user_agent = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        // Check a few values
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_key, "");
        assert_eq!(config.refresh.interval, "6h");
        assert!(config.refresh.refresh_on_start);
        assert_eq!(config.scrape.row_cap, 10);
        assert!(config.scrape.headless);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[server]
port = 9000
api_key = "hunter2"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.api_key, "hunter2");
        // Default values
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.refresh.interval, "6h");
        assert_eq!(config.scrape.feed_url, "https://music.youtube.com");
    }

    #[test]
    fn test_empty_config() {
        let content = "";
        let config: Config = toml::from_str(content).expect("Empty config should work");

        // All defaults
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.refresh.interval, "6h");
        assert_eq!(config.scrape.scroll_delay_ms, 500);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\napi_key = \"secret\"\n\n[refresh]\ninterval = \"30m\"\n",
        )
        .expect("write config");

        let config = Config::load_from(&path).expect("load_from should succeed");
        assert_eq!(config.server.api_key, "secret");
        assert_eq!(config.refresh.interval, "30m");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.toml");
        assert!(Config::load_from(&path).is_err());
    }
}
