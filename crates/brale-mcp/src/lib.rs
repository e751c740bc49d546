//! # brale-mcp
//!
//! MCP server exposing the Brale API tools over stdio.

pub mod config;
pub mod error;
pub mod server;

pub use config::Settings;
pub use error::{Result, ServerError};
pub use server::{BraleServer, SERVER_NAME};
