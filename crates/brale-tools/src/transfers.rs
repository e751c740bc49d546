use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use brale_client::Idempotency;
use brale_common::{Property, Tool, TransferCreateRequest};

use crate::ToolImplementation;
use crate::args::{idempotency_key, payload, pretty, required_strs};
use crate::handle::ClientHandle;
use crate::schema::{self, definition};

pub struct GetTransfersTool {
    handle: ClientHandle,
}

impl GetTransfersTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetTransfersTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_transfers",
            "Retrieve all transfers for a specific account",
            vec![(
                "account_id",
                Property::string("The ID of the account to get transfers for"),
            )],
            &["account_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let transfers = client.get_transfers(account_id).await?;

        Ok(format!(
            "Retrieved {} transfers for account {account_id}:\n{}",
            transfers.len(),
            pretty(&transfers)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

pub struct GetTransferTool {
    handle: ClientHandle,
}

impl GetTransferTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetTransferTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_transfer",
            "Retrieve a specific transfer by ID",
            vec![
                schema::account_id(),
                (
                    "transfer_id",
                    Property::string("The ID of the transfer to retrieve"),
                ),
            ],
            &["account_id", "transfer_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id, transfer_id] = required_strs(args, ["account_id", "transfer_id"])?;
        let transfer = client.get_transfer(account_id, transfer_id).await?;

        Ok(format!("Transfer details:\n{}", pretty(&transfer)?))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

/// Moves funds between two endpoints, e.g. a wire in and a mint out.
pub struct CreateTransferTool {
    handle: ClientHandle,
}

impl CreateTransferTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for CreateTransferTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_create_transfer",
            "Create a transfer for an account. Source and destination each name a value type and transfer type, plus an address_id for on-chain endpoints or a financial_institution_id for fiat endpoints.",
            vec![
                schema::account_id(),
                ("amount", schema::amount()),
                ("source", schema::transfer_endpoint("Where the funds come from")),
                (
                    "destination",
                    schema::transfer_endpoint("Where the funds go"),
                ),
                schema::idempotency_key(),
            ],
            &["account_id", "amount", "source", "destination"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let request: TransferCreateRequest = payload(args, "transfer")?;
        let key = idempotency_key(args)?;

        let created = client
            .create_transfer(account_id, &request, Idempotency::Supplied(key.clone()))
            .await?;

        Ok(format!(
            "Transfer created for account {account_id} (idempotency key: {key}):\n{}",
            pretty(&created)?
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use brale_client::{BraleClient, IDEMPOTENCY_KEY_HEADER};
    use brale_common::BraleConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ToolError;

    fn handle_for(server: &MockServer) -> ClientHandle {
        let config = BraleConfig::new()
            .with_base_url(server.uri())
            .with_bearer_token("tok");
        ClientHandle::with_client(BraleClient::new(config).unwrap())
    }

    fn transfer_json() -> Value {
        json!({
            "status": "processing",
            "amount": "100.00",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "source": {"value_type": "USD", "transfer_type": "wire"},
            "destination": {"value_type": "SBC", "transfer_type": "solana", "address_id": "addr_1"}
        })
    }

    #[tokio::test]
    async fn test_get_transfers_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acct_1/transfers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([transfer_json(), transfer_json()])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetTransfersTool::new(handle_for(&server));
        let result = tool.execute(&json!({"account_id": "acct_1"})).await.unwrap();
        assert!(result.starts_with("Retrieved 2 transfers for account acct_1:\n"));
    }

    #[tokio::test]
    async fn test_get_transfer_requires_both_ids() {
        let server = MockServer::start().await;
        let tool = GetTransferTool::new(handle_for(&server));

        let err = tool
            .execute(&json!({"account_id": "acct_1"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transfer_id is required");
    }

    #[tokio::test]
    async fn test_get_transfer_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acct_1/transfers/tr_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(transfer_json()))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetTransferTool::new(handle_for(&server));
        let result = tool
            .execute(&json!({"account_id": "acct_1", "transfer_id": "tr_1"}))
            .await
            .unwrap();
        assert!(result.starts_with("Transfer details:\n{"));
        assert!(result.contains("\"status\": \"processing\""));
    }

    #[tokio::test]
    async fn test_create_transfer_generates_key() {
        let server = MockServer::start().await;

        let expected_body = json!({
            "amount": {"value": "100.00", "currency": "USD"},
            "source": {"value_type": "USD", "transfer_type": "wire", "financial_institution_id": "fi_1"},
            "destination": {"value_type": "SBC", "transfer_type": "solana", "address_id": "addr_1"}
        });

        Mock::given(method("POST"))
            .and(path("/accounts/acct_1/transfers"))
            .and(header_exists("idempotency-key"))
            .and(body_json(expected_body.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "tr_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut args = expected_body;
        args["account_id"] = json!("acct_1");

        let tool = CreateTransferTool::new(handle_for(&server));
        let result = tool.execute(&args).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let sent_key = requests[0]
            .headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(result.contains(&format!("(idempotency key: {sent_key})")));
        assert!(result.contains("tr_1"));
    }

    #[tokio::test]
    async fn test_create_transfer_rejects_header_breaking_key() {
        let server = MockServer::start().await;

        let tool = CreateTransferTool::new(handle_for(&server));
        let err = tool
            .execute(&json!({
                "account_id": "acct_1",
                "amount": {"value": "1.00", "currency": "USD"},
                "source": {"value_type": "USD", "transfer_type": "wire"},
                "destination": {"value_type": "SBC", "transfer_type": "solana"},
                "idempotency_key": "k\r\nX-Evil: 1"
            }))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::InvalidArguments(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
