//! Server settings.
//!
//! Settings are loaded from `~/.config/brale-mcp/config.toml` when present.
//! Credentials never live here; they come from the environment (or a `.env`
//! file). Endpoint values from the environment take precedence over the file.
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! auto_configure = true
//!
//! [api]
//! base_url = "https://api.brale.xyz"
//! auth_url = "https://auth.brale.xyz"
//! timeout_seconds = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use brale_common::BraleConfig;
use brale_common::config::env;

use crate::error::{Result, ServerError};

/// Settings loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    /// Endpoint overrides for the Brale API.
    #[serde(default)]
    pub api: ApiSettings,
}

/// Startup behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Install a client at startup when credentials are present in the
    /// environment (default: true).
    #[serde(default = "default_auto_configure")]
    pub auto_configure: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            auto_configure: default_auto_configure(),
        }
    }
}

const fn default_auto_configure() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub auth_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Settings {
    /// Loads settings.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and defaults apply otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit path does not exist
    /// - The file cannot be read or parsed
    /// - Validation fails
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ServerError::Config(format!(
                        "Configuration file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::config_path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        Self::load_from(&path)
    }

    /// Loads and validates settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("Failed to read config file: {e}")))?;

        let settings: Self = toml::from_str(&contents)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Returns the default settings file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ServerError::Config("Failed to determine config directory".to_string()))?
            .join("brale-mcp");

        Ok(config_dir.join("config.toml"))
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == Some(0) {
            return Err(ServerError::Config(
                "api.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn file_value(&self, key: &str) -> Option<String> {
        match key {
            env::BASE_URL => self.api.base_url.clone(),
            env::AUTH_URL => self.api.auth_url.clone(),
            env::TIMEOUT_SECONDS => self.api.timeout_seconds.map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Builds the client configuration from `lookup` (normally the process
    /// environment), falling back to these settings for endpoints and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not parse or the timeout is
    /// zero.
    pub fn brale_config<F>(&self, lookup: F) -> Result<BraleConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = BraleConfig::from_lookup(|key| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| self.file_value(key))
        })?;
        Ok(config)
    }
}
