use thiserror::Error;

/// Failures raised by the tool layer itself, before or instead of an API call.
///
/// Tools return `anyhow::Result`; callers that need to tell these apart from
/// API failures use `anyhow::Error::downcast_ref::<ToolError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    /// Arguments are missing, of the wrong type, or otherwise unusable.
    #[error("{0}")]
    InvalidArguments(String),

    /// A resource tool was called before the client was configured.
    #[error("Brale API client not configured. Please run brale_configure first.")]
    NotConfigured,
}
