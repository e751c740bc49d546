//! MCP server exposing the Brale tools.
//!
//! `tools/list` returns every registered tool; `tools/call` routes through
//! the [`ToolExecutor`]. Argument and configuration problems become JSON-RPC
//! errors. API failures become tool results flagged as errors so the host
//! can show them to the model.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool as McpTool,
    ToolAnnotations,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler};
use serde_json::Value;
use tracing::{debug, error, info};

use brale_common::Tool;
use brale_tools::{ToolError, ToolExecutor};

/// Name reported in the MCP handshake.
pub const SERVER_NAME: &str = "brale-api-mcp";

/// Converts a tool definition into its MCP form.
///
/// Auto-approved tools are annotated as read-only.
#[must_use]
pub fn to_mcp_tool(tool: &Tool, auto_approved: bool) -> McpTool {
    let input_schema: JsonObject = match &tool.function.parameters {
        Value::Object(map) => map.clone(),
        _ => JsonObject::new(),
    };

    let mut mcp_tool = McpTool::new(
        tool.function.name.clone(),
        tool.function.description.clone(),
        Arc::new(input_schema),
    );

    let mut annotations = ToolAnnotations::new();
    annotations.read_only_hint = Some(auto_approved);
    annotations.destructive_hint = Some(false);
    mcp_tool.annotations = Some(annotations);

    mcp_tool
}

/// Maps a failed tool call onto the MCP response.
///
/// Tool-layer errors are protocol errors; anything else is a failed tool
/// result.
fn error_response(name: &str, err: &anyhow::Error) -> Result<CallToolResult, ErrorData> {
    match err.downcast_ref::<ToolError>() {
        Some(ToolError::UnknownTool(_)) => Err(ErrorData::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("Unknown tool: {name}"),
            None,
        )),
        Some(ToolError::InvalidArguments(message)) => {
            Err(ErrorData::invalid_params(message.clone(), None))
        }
        Some(ToolError::NotConfigured) => Err(ErrorData::invalid_request(err.to_string(), None)),
        None => Ok(CallToolResult::error(vec![Content::text(format!(
            "Tool execution failed: {err}"
        ))])),
    }
}

/// Handler serving the Brale tools over MCP.
#[derive(Clone)]
pub struct BraleServer {
    executor: Arc<ToolExecutor>,
}

impl BraleServer {
    #[must_use]
    pub const fn new(executor: Arc<ToolExecutor>) -> Self {
        Self { executor }
    }

    /// All tools in MCP form, sorted by name.
    #[must_use]
    pub fn mcp_tools(&self) -> Vec<McpTool> {
        self.executor
            .get_all_tools()
            .iter()
            .map(|tool| {
                to_mcp_tool(
                    tool,
                    self.executor.is_tool_auto_approved(&tool.function.name),
                )
            })
            .collect()
    }

    /// Executes one tool call.
    ///
    /// # Errors
    ///
    /// Returns a JSON-RPC error for unknown tools, invalid arguments and
    /// calls made before configuration.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = arguments.map_or(Value::Null, Value::Object);
        debug!(tool = name, "Received tool request");

        match self.executor.execute(name, &args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) => {
                error!(tool = name, error = %err, "Tool execution failed");
                error_response(name, &err)
            }
        }
    }
}

impl ServerHandler for BraleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Brale API tools. Run brale_configure or brale_auto_configure before calling resource tools unless the server was started with credentials.".to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.mcp_tools();
        info!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments).await
    }
}
