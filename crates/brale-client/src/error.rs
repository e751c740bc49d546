//! Error types for the client library.

use brale_common::ConfigError;
use thiserror::Error;

/// Errors that can occur when talking to the Brale API.
///
/// Every failure of the request pipeline surfaces as exactly one of these
/// values. Nothing is retried internally.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// No usable credential was configured.
    ///
    /// Neither a bearer token nor a full client id/secret pair is present.
    /// Not retryable; fix the configuration.
    #[error(
        "No authentication method available. Provide either bearer_token or client_id/client_secret (missing: {})",
        missing.join(", ")
    )]
    AuthConfiguration {
        /// Names of the absent credential fields.
        missing: Vec<&'static str>,
    },

    /// The client-credentials exchange failed.
    ///
    /// The authorization server rejected the request or could not be
    /// reached. `status` is `None` for transport-level failures.
    #[error("Failed to get access token: {message}")]
    TokenFetch {
        /// HTTP status returned by the authorization server, if any.
        status: Option<u16>,
        /// Upstream error body or transport message.
        message: String,
    },

    /// The API answered a resource call with a non-2xx status.
    ///
    /// `body` is the response body parsed as JSON, or a JSON string holding
    /// the raw text when it was not JSON.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, unmodified.
        body: serde_json::Value,
    },

    /// Network-level failure: DNS, refused connection, timeout.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A supplied idempotency key is blank or not a valid header value.
    ///
    /// Raised before any request is sent. Not retryable; pick another key.
    #[error("Invalid idempotency key: {0}")]
    InvalidIdempotencyKey(String),

    /// A 2xx response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid base URL, auth URL or HTTP client settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl ClientError {
    /// HTTP status attached to this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::TokenFetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if the caller could reasonably retry this request.
    ///
    /// Informational only; the client itself never retries. Read-only calls
    /// are always safe to repeat, and creates are safe to repeat with the
    /// same idempotency key.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::TokenFetch { status, .. } => status.is_none_or(|s| s >= 500),
            _ => false,
        }
    }

    /// Check if this error stems from missing or rejected credentials.
    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::AuthConfiguration { .. }
                | Self::TokenFetch {
                    status: Some(400 | 401 | 403),
                    ..
                }
                | Self::Http {
                    status: 401 | 403,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_auth_configuration_lists_missing_fields() {
        let err = ClientError::AuthConfiguration {
            missing: vec!["bearer_token", "client_id", "client_secret"],
        };
        let message = err.to_string();
        assert!(message.contains("bearer_token, client_id, client_secret"));
        assert!(err.is_authentication_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_http_error_status_and_display() {
        let err = ClientError::Http {
            status: 422,
            body: json!({"error": "invalid_ein"}),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), r#"HTTP 422: {"error":"invalid_ein"}"#);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        let server_error = ClientError::Http {
            status: 503,
            body: json!("unavailable"),
        };
        assert!(server_error.is_retryable());

        let unreachable = ClientError::TokenFetch {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(unreachable.is_retryable());

        let rejected = ClientError::TokenFetch {
            status: Some(401),
            message: "invalid_client".to_string(),
        };
        assert!(!rejected.is_retryable());
        assert!(rejected.is_authentication_error());
        assert_eq!(rejected.status(), Some(401));
    }

    #[test]
    fn test_config_error_conversion() {
        let config = brale_common::BraleConfig::new().with_auth_url("::");
        let err: ClientError = config.validate().unwrap_err().into();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
