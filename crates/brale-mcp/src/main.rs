//! Brale MCP server
//!
//! Serves the Brale API tools to an MCP host over stdio. Stdout carries the
//! protocol, so all logging goes to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{error, info, warn};

use brale_client::BraleClient;
use brale_common::BraleConfig;
use brale_mcp::error::{Result, ServerError};
use brale_mcp::{BraleServer, Settings};
use brale_tools::{ClientHandle, ToolExecutor};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "brale-mcp", version, about = "MCP server for the Brale API")]
struct Cli {
    /// Settings file (default: ~/.config/brale-mcp/config.toml if present).
    #[arg(long, env = "BRALE_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Do not install a client at startup, even when credentials are set.
    #[arg(long)]
    no_auto_configure: bool,

    /// Log output format.
    #[arg(long, env = "BRALE_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,
}

/// Initializes structured logging with tracing.
///
/// Log level is controlled via the `RUST_LOG` environment variable.
fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("brale_mcp=info,brale_tools=info,brale_client=info")
    });

    match format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .init();
        }
    }
}

/// Installs a client built from the environment when credentials are present.
async fn auto_configure(handle: &ClientHandle, config: &BraleConfig) -> Result<()> {
    let missing = config.missing_credentials();
    if !missing.is_empty() {
        info!(
            "No credentials in environment (missing: {}); waiting for brale_configure",
            missing.join(", ")
        );
        return Ok(());
    }

    handle.replace(BraleClient::new(config.clone())?).await;
    info!(base_url = %config.base_url, "Brale API client configured from environment");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env file: {e}");
    }

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    info!("Starting Brale MCP server");

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {e}");
            return Err(e);
        }
    };

    let defaults = settings.brale_config(|key| std::env::var(key).ok())?;
    let handle = ClientHandle::new();

    if settings.server.auto_configure && !cli.no_auto_configure {
        if let Err(e) = auto_configure(&handle, &defaults).await {
            warn!("Auto-configuration failed: {e}");
        }
    }

    let executor = Arc::new(ToolExecutor::with_brale_tools(&handle, defaults));
    info!("Registered {} tool(s)", executor.tool_count());

    let service = BraleServer::new(executor)
        .serve(stdio())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    // Set up signal handlers
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let signals_handle = signals.handle();
    let cancel = service.cancellation_token();
    let signal_task = tokio::spawn(async move {
        use futures::stream::StreamExt;
        while let Some(signal) = signals.next().await {
            match signal {
                SIGTERM => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    cancel.cancel();
                    break;
                }
                SIGINT => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    cancel.cancel();
                    break;
                }
                _ => {}
            }
        }
    });

    info!("Brale API MCP server started on stdio");

    let quit_reason = service
        .waiting()
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    signals_handle.close();
    let _ = signal_task.await;

    info!(reason = ?quit_reason, "Server shutdown complete");

    Ok(())
}
