//! Backend endpoint configuration
//!
//! Base URL resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SAFESCAN_BACKEND_URL` environment variable
//! 3. `backend_url` key in the TOML config file
//! 4. Compiled default (fallback)

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no CLI argument is given
pub const BACKEND_URL_ENV: &str = "SAFESCAN_BACKEND_URL";

/// Default backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default timeout for backend requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Resolved backend configuration shared by all clients
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Build a config with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve the base URL following the priority order above
    pub fn resolve(cli_arg: Option<&str>) -> Self {
        // Priority 1: command-line argument
        if let Some(url) = cli_arg {
            return Self::new(url);
        }

        // Priority 2: environment variable
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.is_empty() {
                return Self::new(url);
            }
        }

        // Priority 3: TOML config file
        if let Ok(path) = config_file_path() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                if let Ok(value) = toml::from_str::<toml::Value>(&contents) {
                    if let Some(url) = value.get("backend_url").and_then(|v| v.as_str()) {
                        return Self::new(url);
                    }
                }
            }
        }

        // Priority 4: compiled default
        Self::new(DEFAULT_BACKEND_URL)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// Platform config file path: `<config dir>/safescan/config.toml`
fn config_file_path() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("safescan").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins() {
        std::env::set_var(BACKEND_URL_ENV, "http://from-env:8000");
        let config = BackendConfig::resolve(Some("http://from-cli:9000"));
        assert_eq!(config.base_url, "http://from-cli:9000");
        std::env::remove_var(BACKEND_URL_ENV);
    }

    #[test]
    #[serial]
    fn env_var_used_without_cli_argument() {
        std::env::set_var(BACKEND_URL_ENV, "http://from-env:8000");
        let config = BackendConfig::resolve(None);
        assert_eq!(config.base_url, "http://from-env:8000");
        std::env::remove_var(BACKEND_URL_ENV);
    }

    #[test]
    #[serial]
    fn falls_back_to_compiled_default() {
        std::env::remove_var(BACKEND_URL_ENV);
        let config = BackendConfig::resolve(None);
        // Either the default or a value from an actual config file on the
        // host; both are non-empty http URLs.
        assert!(config.base_url.starts_with("http"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = BackendConfig::new("http://localhost:8000/");
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
