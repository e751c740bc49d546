//! # brale-tools
//!
//! Brale API operations packaged as callable tools.
//!
//! Each tool wraps one [`BraleClient`](brale_client::BraleClient) method,
//! validates its JSON arguments, and renders the result as text for a
//! tool-calling host.
//!
//! ## Core Components
//!
//! - [`ToolImplementation`]: Trait implemented by every tool
//! - [`ToolRegistry`]: Thread-safe registry of tools by name
//! - [`ToolExecutor`]: Routes a call by name to its tool
//! - [`ClientHandle`]: The replaceable client shared by all resource tools
//!
//! ## Example
//!
//! ```rust
//! use brale_common::BraleConfig;
//! use brale_tools::{ClientHandle, ToolExecutor};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let handle = ClientHandle::new();
//! let executor = ToolExecutor::with_brale_tools(&handle, BraleConfig::from_env()?);
//!
//! executor
//!     .execute("brale_configure", &json!({"bearer_token": "token"}))
//!     .await?;
//! let accounts = executor.execute("brale_get_accounts", &json!({})).await?;
//! println!("{accounts}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Tool Auto-Approval
//!
//! Read tools report [`ToolImplementation::is_auto_approved`] as `true`.
//! Create and configure tools do not, so a host can ask before moving money
//! or swapping credentials.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use serde_json::Value;

use brale_common::{BraleConfig, Tool};

mod accounts;
mod addresses;
pub mod args;
mod automations;
mod configure;
pub mod error;
mod handle;
mod institutions;
mod schema;
mod transfers;

pub use accounts::{CreateAccountTool, GetAccountTool, GetAccountsTool};
pub use addresses::{CreateExternalAddressTool, GetAddressBalancesTool, GetAddressesTool};
pub use automations::{CreateAutomationTool, GetAutomationTool, GetAutomationsTool};
pub use configure::{AutoConfigureTool, ConfigureTool};
pub use error::ToolError;
pub use handle::ClientHandle;
pub use institutions::{
    CreateExternalFinancialInstitutionTool, GetFinancialInstitutionTool,
    GetFinancialInstitutionsTool,
};
pub use transfers::{CreateTransferTool, GetTransferTool, GetTransfersTool};

#[async_trait]
pub trait ToolImplementation: Send + Sync {
    fn get_definition(&self) -> Tool;

    async fn execute(&self, args: &Value) -> Result<String>;

    fn is_auto_approved(&self) -> bool {
        false
    }
}

/// Creates every Brale tool, all sharing `handle`.
///
/// `defaults` is the environment-derived configuration the configure tools
/// start from.
#[must_use]
pub fn create_brale_tools(
    handle: &ClientHandle,
    defaults: &BraleConfig,
) -> Vec<Arc<dyn ToolImplementation>> {
    vec![
        Arc::new(ConfigureTool::new(handle.clone(), defaults.clone())),
        Arc::new(AutoConfigureTool::new(handle.clone(), defaults.clone())),
        Arc::new(GetAccountsTool::new(handle.clone())),
        Arc::new(GetAccountTool::new(handle.clone())),
        Arc::new(CreateAccountTool::new(handle.clone())),
        Arc::new(GetTransfersTool::new(handle.clone())),
        Arc::new(GetTransferTool::new(handle.clone())),
        Arc::new(CreateTransferTool::new(handle.clone())),
        Arc::new(GetAddressesTool::new(handle.clone())),
        Arc::new(GetAddressBalancesTool::new(handle.clone())),
        Arc::new(CreateExternalAddressTool::new(handle.clone())),
        Arc::new(GetFinancialInstitutionsTool::new(handle.clone())),
        Arc::new(GetFinancialInstitutionTool::new(handle.clone())),
        Arc::new(CreateExternalFinancialInstitutionTool::new(handle.clone())),
        Arc::new(GetAutomationsTool::new(handle.clone())),
        Arc::new(GetAutomationTool::new(handle.clone())),
        Arc::new(CreateAutomationTool::new(handle.clone())),
    ]
}

pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn ToolImplementation>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// Registers `tool` under its definition's name, replacing any tool of
    /// the same name.
    pub fn register(&self, tool: Arc<dyn ToolImplementation>) {
        let name = tool.get_definition().function.name;
        self.tools.insert(name, tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.tools.get(name).map(|r| r.value().clone())
    }

    /// All definitions, sorted by name.
    #[must_use]
    pub fn get_all_definitions(&self) -> Vec<Tool> {
        let mut definitions: Vec<Tool> = self.tools.iter().map(|t| t.get_definition()).collect();
        definitions.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        definitions
    }

    #[must_use]
    pub fn is_tool_auto_approved(&self, name: &str) -> bool {
        self.tools.get(name).is_some_and(|t| t.is_auto_approved())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// An executor with every Brale tool registered.
    #[must_use]
    pub fn with_brale_tools(handle: &ClientHandle, defaults: BraleConfig) -> Self {
        let mut executor = Self::new();
        for tool in create_brale_tools(handle, &defaults) {
            executor.add_tool_arc(tool);
        }
        executor
    }

    pub fn add_tool<T: ToolImplementation + 'static>(&mut self, tool: T) {
        self.registry.register(Arc::new(tool));
    }

    pub fn add_tool_arc(&mut self, tool: Arc<dyn ToolImplementation>) {
        self.registry.register(tool);
    }

    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    #[must_use]
    pub fn get_all_tools(&self) -> Vec<Tool> {
        self.registry.get_all_definitions()
    }

    #[must_use]
    pub fn is_tool_auto_approved(&self, name: &str) -> bool {
        self.registry.is_tool_auto_approved(name)
    }

    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Execute the named tool.
    ///
    /// Missing arguments (`null`) are treated as an empty object.
    ///
    /// # Errors
    /// Returns [`ToolError::UnknownTool`] if no tool has that name,
    /// [`ToolError::InvalidArguments`] for non-object arguments, or whatever
    /// the tool itself fails with.
    pub async fn execute(&self, name: &str, args: &Value) -> Result<String> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args = Self::normalize_arguments(args)?;

        debug!("Executing tool '{name}'");
        tool.execute(&args).await
    }

    fn normalize_arguments(args: &Value) -> Result<Value, ToolError> {
        match args {
            Value::Null => Ok(Value::Object(serde_json::Map::new())),
            Value::Object(_) => Ok(args.clone()),
            _ => Err(ToolError::InvalidArguments(
                "Expected object arguments".to_string(),
            )),
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl ToolImplementation for EchoTool {
        fn get_definition(&self) -> Tool {
            schema::definition("echo", "Echo the arguments", Vec::new(), &[])
        }

        async fn execute(&self, args: &Value) -> Result<String> {
            Ok(args.to_string())
        }
    }

    fn brale_executor() -> ToolExecutor {
        ToolExecutor::with_brale_tools(&ClientHandle::new(), BraleConfig::new())
    }

    #[test]
    fn test_normalize_arguments() {
        assert_eq!(
            ToolExecutor::normalize_arguments(&Value::Null).unwrap(),
            json!({})
        );
        assert_eq!(
            ToolExecutor::normalize_arguments(&json!({"k": 1})).unwrap(),
            json!({"k": 1})
        );
        assert!(ToolExecutor::normalize_arguments(&json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_execute_routes_by_name() {
        let mut executor = ToolExecutor::new();
        executor.add_tool(EchoTool);

        let result = executor.execute("echo", &Value::Null).await.unwrap();
        assert_eq!(result, "{}");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let executor = brale_executor();
        let err = executor.execute("brale_delete_everything", &json!({})).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ToolError>(),
            Some(&ToolError::UnknownTool("brale_delete_everything".to_string()))
        );
        assert_eq!(err.to_string(), "Unknown tool: 'brale_delete_everything'");
    }

    #[test]
    fn test_all_brale_tools_registered() {
        let executor = brale_executor();
        assert_eq!(executor.tool_count(), 17);

        let names: Vec<String> = executor
            .get_all_tools()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.iter().all(|n| n.starts_with("brale_")));

        for name in [
            "brale_configure",
            "brale_auto_configure",
            "brale_get_address_balances",
            "brale_create_external_financial_institution",
        ] {
            assert!(executor.has_tool(name), "missing {name}");
        }
    }

    #[test]
    fn test_approval_policy() {
        let executor = brale_executor();
        for tool in executor.get_all_tools() {
            let name = tool.function.name;
            let expected = name.starts_with("brale_get_");
            assert_eq!(executor.is_tool_auto_approved(&name), expected, "{name}");
        }
    }

    #[test]
    fn test_create_tools_accept_idempotency_key() {
        let executor = brale_executor();
        for tool in executor.get_all_tools() {
            let has_key = tool.function.parameters["properties"]
                .get(args::IDEMPOTENCY_KEY_ARG)
                .is_some();
            assert_eq!(
                has_key,
                tool.function.name.starts_with("brale_create_"),
                "{}",
                tool.function.name
            );
        }
    }

    #[tokio::test]
    async fn test_resource_tool_before_configure() {
        let executor = brale_executor();
        let err = executor
            .execute("brale_get_accounts", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Brale API client not configured. Please run brale_configure first."
        );
    }

    #[tokio::test]
    async fn test_configure_then_call() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let executor = brale_executor();
        executor
            .execute(
                "brale_configure",
                &json!({"bearer_token": "tok", "base_url": server.uri()}),
            )
            .await
            .unwrap();

        let result = executor
            .execute("brale_get_accounts", &json!({}))
            .await
            .unwrap();
        assert_eq!(result, "Retrieved 0 accounts:\n[]");
    }
}
