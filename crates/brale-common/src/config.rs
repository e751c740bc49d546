//! Client configuration for the Brale API.
//!
//! A [`BraleConfig`] is built once and handed to the client at construction.
//! Reconfiguring means building a new client; nothing here is global.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.brale.xyz";

/// Production authorization server.
pub const DEFAULT_AUTH_URL: &str = "https://auth.brale.xyz";

/// Environment variable names read by [`BraleConfig::from_env`].
pub mod env {
    /// Base API URL override.
    pub const BASE_URL: &str = "BRALE_BASE_URL";
    /// Authorization server URL override.
    pub const AUTH_URL: &str = "BRALE_AUTH_URL";
    /// Pre-issued bearer token.
    pub const BEARER_TOKEN: &str = "BRALE_BEARER_TOKEN";
    /// OAuth2 client identifier.
    pub const CLIENT_ID: &str = "BRALE_CLIENT_ID";
    /// OAuth2 client secret.
    pub const CLIENT_SECRET: &str = "BRALE_CLIENT_SECRET";
    /// Request timeout in seconds.
    pub const TIMEOUT_SECONDS: &str = "BRALE_TIMEOUT_SECONDS";
}

/// Errors raised while assembling a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL could not be parsed.
    #[error("Invalid {field} '{value}': {source}")]
    InvalidUrl {
        /// Which setting held the URL.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// A numeric setting could not be parsed.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidNumber {
        /// Which setting held the value.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Configuration for a Brale API client.
///
/// Holds the endpoints and exactly the credentials the token manager needs:
/// either a bearer token, or a client id/secret pair for the OAuth2
/// client-credentials grant. When both are present the bearer token wins.
///
/// Secrets are stored as [`SecretString`] and are never serialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct BraleConfig {
    /// Base URL for resource calls.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL of the authorization server.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Pre-issued bearer token.
    #[serde(skip_serializing, default)]
    pub bearer_token: Option<SecretString>,
    /// OAuth2 client identifier.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    #[serde(skip_serializing, default)]
    pub client_secret: Option<SecretString>,
    /// Request timeout in seconds. `None` keeps the transport default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

impl fmt::Debug for BraleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraleConfig")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for BraleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            bearer_token: None,
            client_id: None,
            client_secret: None,
            timeout_seconds: None,
        }
    }
}

impl BraleConfig {
    /// Creates a configuration pointing at the production endpoints with no
    /// credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use brale_common::BraleConfig;
    ///
    /// let config = BraleConfig::new()
    ///     .with_client_credentials("client-id", "client-secret")
    ///     .with_base_url("https://api.brale.xyz");
    /// assert!(config.has_client_credentials());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base API URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the authorization server URL.
    #[must_use]
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Sets a pre-issued bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the OAuth2 client id and secret.
    #[must_use]
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(SecretString::from(client_secret.into()));
        self
    }

    /// Sets the request timeout. Zero is rejected by
    /// [`BraleConfig::validate`].
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Returns `true` when a bearer token is configured.
    #[must_use]
    pub const fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Returns `true` when both client id and secret are configured.
    #[must_use]
    pub const fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Names the credential fields that are absent.
    ///
    /// Empty when either a bearer token or a full client id/secret pair is
    /// available.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        if self.has_bearer_token() || self.has_client_credentials() {
            return Vec::new();
        }

        let mut missing = vec!["bearer_token"];
        if self.client_id.is_none() {
            missing.push("client_id");
        }
        if self.client_secret.is_none() {
            missing.push("client_secret");
        }
        missing
    }

    /// Checks that both URLs parse and that any timeout is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] naming the offending setting, or
    /// [`ConfigError::InvalidNumber`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidNumber {
                field: "timeout_seconds",
                value: "0".to_string(),
            });
        }

        for (field, value) in [("base_url", &self.base_url), ("auth_url", &self.auth_url)] {
            url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
                field,
                value: value.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `BRALE_BASE_URL`, `BRALE_AUTH_URL`, `BRALE_BEARER_TOKEN`,
    /// `BRALE_CLIENT_ID`, `BRALE_CLIENT_SECRET` and `BRALE_TIMEOUT_SECONDS`.
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a positive number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// [`BraleConfig::from_env`] is this function over `std::env::var`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a positive number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_seconds = get(env::TIMEOUT_SECONDS)
            .map(|raw| {
                match raw.trim().parse::<u64>() {
                    Ok(seconds) if seconds > 0 => Ok(seconds),
                    _ => Err(ConfigError::InvalidNumber {
                        field: env::TIMEOUT_SECONDS,
                        value: raw,
                    }),
                }
            })
            .transpose()?;

        Ok(Self {
            base_url: get(env::BASE_URL).unwrap_or_else(default_base_url),
            auth_url: get(env::AUTH_URL).unwrap_or_else(default_auth_url),
            bearer_token: get(env::BEARER_TOKEN).map(SecretString::from),
            client_id: get(env::CLIENT_ID),
            client_secret: get(env::CLIENT_SECRET).map(SecretString::from),
            timeout_seconds,
        })
    }
}
