use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serde_json::Value;

use brale_client::{BraleClient, ClientError};
use brale_common::{BraleConfig, Property, Tool};

use crate::args::{optional_bool, optional_str};
use crate::error::ToolError;
use crate::handle::ClientHandle;
use crate::schema::definition;
use crate::ToolImplementation;

fn base_url_property(defaults: &BraleConfig) -> (&'static str, Property) {
    (
        "base_url",
        Property::string(format!(
            "The base URL for the Brale API (default: {})",
            defaults.base_url
        ))
        .with_default(defaults.base_url.clone()),
    )
}

fn build_client(config: BraleConfig) -> Result<BraleClient, ToolError> {
    BraleClient::new(config).map_err(|e| match e {
        ClientError::Configuration(message) => ToolError::InvalidArguments(message),
        other => ToolError::InvalidArguments(other.to_string()),
    })
}

fn env_status(value: bool) -> &'static str {
    if value { "SET" } else { "MISSING" }
}

/// Installs a client built from a bearer token or from the client
/// credentials found in the environment.
pub struct ConfigureTool {
    handle: ClientHandle,
    defaults: BraleConfig,
}

impl ConfigureTool {
    /// `defaults` supplies the environment credentials, auth URL and timeout.
    #[must_use]
    pub const fn new(handle: ClientHandle, defaults: BraleConfig) -> Self {
        Self { handle, defaults }
    }

    fn config_for(&self, args: &Value) -> Result<(BraleConfig, &'static str), ToolError> {
        let base_url =
            optional_str(args, "base_url")?.unwrap_or_else(|| self.defaults.base_url.clone());
        let bearer_token = optional_str(args, "bearer_token")?;
        let use_env_credentials = optional_bool(args, "use_env_credentials")?.unwrap_or(true);

        let mut config = self.defaults.clone().with_base_url(base_url);
        config.bearer_token = None;

        if let Some(token) = bearer_token {
            config.client_id = None;
            config.client_secret = None;
            return Ok((config.with_bearer_token(token), "Bearer token"));
        }

        if !use_env_credentials {
            return Err(ToolError::InvalidArguments(
                "Either bearer_token must be provided or use_env_credentials must be true with BRALE_CLIENT_ID and BRALE_CLIENT_SECRET set in environment variables.".to_string(),
            ));
        }

        if !config.has_client_credentials() {
            return Err(ToolError::InvalidArguments(format!(
                "BRALE_CLIENT_ID and BRALE_CLIENT_SECRET environment variables are required when using OAuth2 client credentials. Please set them in your .env file. Currently loaded: ID={}, SECRET={}",
                env_status(config.client_id.is_some()),
                env_status(config.client_secret.is_some()),
            )));
        }

        Ok((config, "OAuth2 client credentials"))
    }
}

#[async_trait]
impl ToolImplementation for ConfigureTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_configure",
            "Configure the Brale API client with authentication credentials. Use either bearer_token or client credentials from environment variables.",
            vec![
                base_url_property(&self.defaults),
                (
                    "bearer_token",
                    Property::string(
                        "The Bearer token for authentication (optional if using client credentials from .env)",
                    ),
                ),
                (
                    "use_env_credentials",
                    Property::boolean(
                        "Use BRALE_CLIENT_ID and BRALE_CLIENT_SECRET from environment variables for OAuth2 authentication",
                    )
                    .with_default(true),
                ),
            ],
            &[],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let (config, auth_method) = self.config_for(args)?;
        let base_url = config.base_url.clone();

        self.handle.replace(build_client(config)?).await;
        info!("Brale API client configured (base_url: {base_url}, auth: {auth_method})");

        Ok(format!(
            "Brale API client configured successfully with base URL: {base_url} using {auth_method}"
        ))
    }
}

/// Installs a client using only the client credentials from the
/// environment.
pub struct AutoConfigureTool {
    handle: ClientHandle,
    defaults: BraleConfig,
}

impl AutoConfigureTool {
    #[must_use]
    pub const fn new(handle: ClientHandle, defaults: BraleConfig) -> Self {
        Self { handle, defaults }
    }
}

#[async_trait]
impl ToolImplementation for AutoConfigureTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_auto_configure",
            "Automatically configure the Brale API client using environment variables (BRALE_CLIENT_ID and BRALE_CLIENT_SECRET)",
            vec![base_url_property(&self.defaults)],
            &[],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        if !self.defaults.has_client_credentials() {
            return Err(ToolError::InvalidArguments(
                "BRALE_CLIENT_ID and BRALE_CLIENT_SECRET environment variables are required. Please set them in your .env file:\n\nBRALE_CLIENT_ID=\"your_client_id_here\"\nBRALE_CLIENT_SECRET=\"your_client_secret_here\"".to_string(),
            )
            .into());
        }

        let base_url =
            optional_str(args, "base_url")?.unwrap_or_else(|| self.defaults.base_url.clone());
        let mut config = self.defaults.clone().with_base_url(base_url.clone());
        config.bearer_token = None;

        self.handle.replace(build_client(config)?).await;
        info!("Brale API client auto-configured from environment (base_url: {base_url})");

        Ok(format!(
            "Brale API client automatically configured with OAuth2 client credentials from environment variables. Base URL: {base_url}"
        ))
    }
}
