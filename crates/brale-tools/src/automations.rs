use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use brale_client::Idempotency;
use brale_common::{AutomationCreateRequest, Property, Tool};

use crate::ToolImplementation;
use crate::args::{idempotency_key, payload, pretty, required_strs};
use crate::handle::ClientHandle;
use crate::schema::{self, definition};

pub struct GetAutomationsTool {
    handle: ClientHandle,
}

impl GetAutomationsTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAutomationsTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_automations",
            "Retrieve all automations for a specific account",
            vec![schema::account_id()],
            &["account_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let automations = client.get_automations(account_id).await?;

        Ok(format!(
            "Retrieved automations for account {account_id}:\n{}",
            pretty(&automations)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

pub struct GetAutomationTool {
    handle: ClientHandle,
}

impl GetAutomationTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAutomationTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_automation",
            "Retrieve a specific automation by ID",
            vec![
                schema::account_id(),
                (
                    "automation_id",
                    Property::string("The ID of the automation to retrieve"),
                ),
            ],
            &["account_id", "automation_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id, automation_id] = required_strs(args, ["account_id", "automation_id"])?;
        let automation = client.get_automation(account_id, automation_id).await?;

        Ok(format!("Automation details:\n{}", pretty(&automation)?))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

/// Sets up a deposit automation: wires received on the issued instructions
/// are minted to the destination address.
pub struct CreateAutomationTool {
    handle: ClientHandle,
}

impl CreateAutomationTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for CreateAutomationTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_create_automation",
            "Create a deposit automation that mints incoming wires to a destination address",
            vec![
                schema::account_id(),
                ("name", Property::string("Display name for the automation")),
                ("destination_address", schema::automation_destination()),
                schema::idempotency_key(),
            ],
            &["account_id", "name", "destination_address"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let request: AutomationCreateRequest = payload(args, "automation")?;
        let key = idempotency_key(args)?;

        let created = client
            .create_automation(account_id, &request, Idempotency::Supplied(key.clone()))
            .await?;

        Ok(format!(
            "Automation created for account {account_id} (idempotency key: {key}):\n{}",
            pretty(&created)?
        ))
    }
}
