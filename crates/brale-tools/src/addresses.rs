use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use brale_client::Idempotency;
use brale_common::{AddressCreateRequest, Property, Tool};

use crate::ToolImplementation;
use crate::args::{idempotency_key, payload, pretty, required_strs};
use crate::handle::ClientHandle;
use crate::schema::{self, definition};

pub struct GetAddressesTool {
    handle: ClientHandle,
}

impl GetAddressesTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAddressesTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_addresses",
            "Retrieve all addresses for a specific account",
            vec![(
                "account_id",
                Property::string("The ID of the account to get addresses for"),
            )],
            &["account_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let addresses = client.get_addresses(account_id).await?;

        Ok(format!(
            "Retrieved addresses for account {account_id}:\n{}",
            pretty(&addresses)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

pub struct GetAddressBalancesTool {
    handle: ClientHandle,
}

impl GetAddressBalancesTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAddressBalancesTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_address_balances",
            "Retrieve balances for a specific address",
            vec![
                schema::account_id(),
                ("address_id", Property::string("The ID of the address")),
                (
                    "transfer_type",
                    Property::string("The blockchain environment (e.g., Solana, Ethereum)"),
                ),
                (
                    "value_type",
                    Property::string("The stablecoin token or currency code"),
                ),
            ],
            &["account_id", "address_id", "transfer_type", "value_type"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id, address_id, transfer_type, value_type] = required_strs(
            args,
            ["account_id", "address_id", "transfer_type", "value_type"],
        )?;

        debug!(
            "Fetching balances for address {address_id} (account: {account_id}, transfer_type: {transfer_type}, value_type: {value_type})"
        );
        let balances = client
            .get_address_balances(account_id, address_id, transfer_type, value_type)
            .await?;

        Ok(format!("Address balances:\n{}", pretty(&balances)?))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

/// Registers an externally held on-chain address.
pub struct CreateExternalAddressTool {
    handle: ClientHandle,
}

impl CreateExternalAddressTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for CreateExternalAddressTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_create_external_address",
            "Register an external blockchain address for an account",
            vec![
                schema::account_id(),
                ("name", Property::string("Display name for the address")),
                (
                    "transfer_types",
                    Property::string_array("Blockchains the address is used on, e.g. [\"solana\"]"),
                ),
                ("address", Property::string("The on-chain address")),
                schema::idempotency_key(),
            ],
            &["account_id", "name", "transfer_types", "address"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let request: AddressCreateRequest = payload(args, "address")?;
        let key = idempotency_key(args)?;

        let created = client
            .create_external_address(account_id, &request, Idempotency::Supplied(key.clone()))
            .await?;

        Ok(format!(
            "External address created for account {account_id} (idempotency key: {key}):\n{}",
            pretty(&created)?
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use brale_client::BraleClient;
    use brale_common::BraleConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn handle_for(server: &MockServer) -> ClientHandle {
        let config = BraleConfig::new()
            .with_base_url(server.uri())
            .with_bearer_token("tok");
        ClientHandle::with_client(BraleClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_get_addresses_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acct_1/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "addresses": [{
                    "id": "addr_1",
                    "status": "active",
                    "name": "Treasury",
                    "address": "So1ana",
                    "transfer_types": ["solana"]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetAddressesTool::new(handle_for(&server));
        let result = tool.execute(&json!({"account_id": "acct_1"})).await.unwrap();
        assert!(result.starts_with("Retrieved addresses for account acct_1:\n{"));
        assert!(result.contains("\"addresses\""));
    }

    #[tokio::test]
    async fn test_get_address_balances_sends_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acct_1/addresses/addr_1/balance"))
            .and(query_param("transfer_type", "solana"))
            .and(query_param("value_type", "SBC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "active",
                "name": "Treasury",
                "address": "So1ana",
                "transfer_types": ["solana"],
                "balances": [{"balance": "42.00", "value_type": "SBC"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetAddressBalancesTool::new(handle_for(&server));
        let result = tool
            .execute(&json!({
                "account_id": "acct_1",
                "address_id": "addr_1",
                "transfer_type": "solana",
                "value_type": "SBC"
            }))
            .await
            .unwrap();
        assert!(result.starts_with("Address balances:\n"));
        assert!(result.contains("42.00"));
    }

    #[tokio::test]
    async fn test_get_address_balances_lists_missing() {
        let server = MockServer::start().await;
        let tool = GetAddressBalancesTool::new(handle_for(&server));

        let err = tool
            .execute(&json!({"account_id": "acct_1", "address_id": "addr_1"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transfer_type and value_type are required");
    }

    #[tokio::test]
    async fn test_create_external_address() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts/acct_1/addresses/external"))
            .and(header("idempotency-key", "addr-key"))
            .and(body_json(json!({
                "name": "Cold wallet",
                "transfer_types": ["solana"],
                "address": "So1ana"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "addr_2"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CreateExternalAddressTool::new(handle_for(&server));
        let result = tool
            .execute(&json!({
                "account_id": "acct_1",
                "name": "Cold wallet",
                "transfer_types": ["solana"],
                "address": "So1ana",
                "idempotency_key": "addr-key"
            }))
            .await
            .unwrap();
        assert!(result.contains("addr_2"));
        assert!(result.contains("idempotency key: addr-key"));
    }
}
