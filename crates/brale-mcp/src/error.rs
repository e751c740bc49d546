//! Error types for the Brale MCP server.

use thiserror::Error;

use brale_client::ClientError;
use brale_common::ConfigError;

/// Errors that stop the server from starting or running.
///
/// Tool failures are not represented here; they are reported to the host as
/// tool results or JSON-RPC errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error (settings file, signal registration).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid server settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid Brale API configuration from the environment or settings.
    #[error("Brale configuration error: {0}")]
    Brale(#[from] ConfigError),

    /// The startup client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// The MCP transport failed to initialize or terminated abnormally.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias using `ServerError`.
pub type Result<T> = std::result::Result<T, ServerError>;
