//! Bearer token lifecycle.
//!
//! The [`TokenManager`] owns one cached access token and the instant after
//! which it must no longer be used. Before every API call the dispatcher asks
//! it for a valid token; the manager then either reuses the cached one,
//! adopts the configured bearer token, or performs an OAuth2
//! client-credentials exchange against `{auth_url}/oauth2/token`.
//!
//! The cache sits behind an async mutex that is held across the exchange, so
//! concurrent callers that find the cache stale wait for the single
//! in-flight fetch and reuse its result.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, error, info, warn};
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use brale_common::BraleConfig;

use crate::error::ClientError;

/// Path of the token endpoint, relative to the auth URL.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Seconds subtracted from a fetched token's lifetime so it is refreshed
/// before the server starts rejecting it.
pub const REFRESH_MARGIN_SECS: u64 = 300;

/// Lifetime assumed for a configured bearer token.
///
/// The real expiry is unknown to the client; 24 hours is a session-length
/// default, not a guarantee.
pub const CONFIGURED_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Response of the client-credentials exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The issued access token.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds, relative to the response.
    pub expires_in: u64,
}

/// Credentials resolved once from the configuration.
enum Credentials {
    Bearer(SecretString),
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
    },
    Missing(Vec<&'static str>),
}

impl Credentials {
    fn from_config(config: &BraleConfig) -> Self {
        if let Some(token) = &config.bearer_token {
            return Self::Bearer(token.clone());
        }
        match (&config.client_id, &config.client_secret) {
            (Some(client_id), Some(client_secret)) => Self::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            },
            _ => Self::Missing(config.missing_credentials()),
        }
    }
}

/// Cached token and its expiry. `expires_at == None` means "already expired".
#[derive(Default)]
struct TokenState {
    token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    fn usable_at(&self, now: DateTime<Utc>) -> Option<&SecretString> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at)) if now < expires_at => Some(token),
            _ => None,
        }
    }

    fn store(&mut self, token: SecretString, expires_at: DateTime<Utc>) {
        self.token = Some(token);
        self.expires_at = Some(expires_at);
    }
}

/// Adds `seconds` to `now`, saturating at the largest representable instant.
fn expiry_after(now: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Owns the cached bearer token for one configured client.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    state: Mutex<TokenState>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match &self.credentials {
            Credentials::Bearer(_) => "bearer_token",
            Credentials::ClientCredentials { .. } => "client_credentials",
            Credentials::Missing(_) => "none",
        };
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("method", &method)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a manager with an empty cache.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &BraleConfig) -> Self {
        Self {
            http,
            token_url: format!("{}{TOKEN_PATH}", config.auth_url.trim_end_matches('/')),
            credentials: Credentials::from_config(config),
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Full URL of the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Instant after which the cached token is treated as invalid.
    ///
    /// `None` when nothing has been cached yet.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.expires_at
    }

    /// Returns a token that is valid right now.
    ///
    /// 1. A cached token whose expiry lies in the future is returned as is.
    /// 2. Otherwise a configured bearer token is adopted for
    ///    [`CONFIGURED_TOKEN_TTL_SECS`].
    /// 3. Otherwise a new token is fetched with the client-credentials grant
    ///    and cached until `expires_in - REFRESH_MARGIN_SECS` from now.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthConfiguration`] when no credentials are
    ///   configured; no request is made.
    /// - [`ClientError::TokenFetch`] when the exchange fails; nothing is
    ///   cached.
    pub async fn ensure_valid_token(&self) -> Result<SecretString, ClientError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        debug!(
            "Checking token status (has_token: {}, expires_at: {:?})",
            state.token.is_some(),
            state.expires_at
        );

        if let Some(token) = state.usable_at(now) {
            debug!("Using existing valid token");
            return Ok(token.clone());
        }

        match &self.credentials {
            Credentials::Bearer(token) => {
                info!("Using bearer token from config");
                state.store(token.clone(), expiry_after(now, CONFIGURED_TOKEN_TTL_SECS));
                Ok(token.clone())
            }
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                info!("Getting new token with client credentials");
                let response = self.fetch_token(client_id, client_secret).await?;
                let fetched_at = Utc::now();

                if response.expires_in <= REFRESH_MARGIN_SECS {
                    warn!(
                        "Token lifetime {}s is within the {REFRESH_MARGIN_SECS}s refresh margin; it will be refetched on next use",
                        response.expires_in
                    );
                }

                let lifetime = response.expires_in.saturating_sub(REFRESH_MARGIN_SECS);
                let token = SecretString::from(response.access_token);
                state.store(token.clone(), expiry_after(fetched_at, lifetime));
                info!("New token obtained (expires_in: {})", response.expires_in);

                Ok(token)
            }
            Credentials::Missing(missing) => Err(ClientError::AuthConfiguration {
                missing: missing.clone(),
            }),
        }
    }

    /// Performs the client-credentials exchange.
    async fn fetch_token(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenResponse, ClientError> {
        let credentials =
            BASE64_STANDARD.encode(format!("{client_id}:{}", client_secret.expose_secret()));

        debug!("Requesting new access token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to get access token: {e}");
                ClientError::TokenFetch {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::TokenFetch {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            error!(
                "Token endpoint returned status {}: {body}",
                status.as_u16()
            );
            return Err(ClientError::TokenFetch {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::TokenFetch {
            status: Some(status.as_u16()),
            message: format!("invalid token response: {e}"),
        })
    }
}
