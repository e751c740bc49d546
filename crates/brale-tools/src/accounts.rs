use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use brale_client::Idempotency;
use brale_common::{AccountCreateRequest, Property, Tool};

use crate::ToolImplementation;
use crate::args::{idempotency_key, payload, pretty, required_strs};
use crate::handle::ClientHandle;
use crate::schema::{self, definition};

/// Lists every account visible to the credentials.
pub struct GetAccountsTool {
    handle: ClientHandle,
}

impl GetAccountsTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAccountsTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_accounts",
            "Retrieve all accounts from Brale API",
            Vec::new(),
            &[],
        )
    }

    async fn execute(&self, _args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let accounts = client.get_accounts().await?;

        Ok(format!(
            "Retrieved {} accounts:\n{}",
            accounts.len(),
            pretty(&accounts)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

pub struct GetAccountTool {
    handle: ClientHandle,
}

impl GetAccountTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetAccountTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_account",
            "Retrieve a specific account by ID from Brale API",
            vec![(
                "account_id",
                Property::string("The ID of the account to retrieve"),
            )],
            &["account_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let account = client.get_account(account_id).await?;

        Ok(format!("Account details:\n{}", pretty(&account)?))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

/// Opens a new business account.
pub struct CreateAccountTool {
    handle: ClientHandle,
}

impl CreateAccountTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for CreateAccountTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_create_account",
            "Create a new business account",
            vec![
                ("business_name", Property::string("Legal business name")),
                ("ein", Property::string("Employer identification number")),
                (
                    "business_type",
                    Property::string("Business type, e.g. llc or corporation"),
                ),
                ("address", schema::postal_address("Business address")),
                ("phone_number", Property::string("Business phone number")),
                ("email", Property::string("Business email address")),
                ("website", Property::string("Business website")),
                ("business_controller", schema::business_controller()),
                schema::idempotency_key(),
            ],
            &[
                "business_name",
                "ein",
                "business_type",
                "address",
                "phone_number",
                "email",
                "business_controller",
            ],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let request: AccountCreateRequest = payload(args, "account")?;
        let key = idempotency_key(args)?;

        let created = client
            .create_account(&request, Idempotency::Supplied(key.clone()))
            .await?;

        Ok(format!(
            "Account created (idempotency key: {key}):\n{}",
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
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ToolError;

    fn address() -> Value {
        json!({
            "street_line_1": "1 Main St",
            "city": "Des Moines",
            "state": "IA",
            "zip": "50309",
            "country": "US"
        })
    }

    fn account_args() -> Value {
        json!({
            "business_name": "Acme",
            "ein": "12-3456789",
            "business_type": "llc",
            "address": address(),
            "phone_number": "+15555550100",
            "email": "ops@acme.test",
            "business_controller": {
                "name": "Jo Doe",
                "ssn": "000-00-0000",
                "address": address()
            }
        })
    }

    fn handle_for(server: &MockServer) -> ClientHandle {
        let config = BraleConfig::new()
            .with_base_url(server.uri())
            .with_bearer_token("tok");
        ClientHandle::with_client(BraleClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_get_accounts_output() {
        let server = MockServer::start().await;
        let mut account = account_args();
        account["id"] = json!("acct_1");
        account["status"] = json!("complete");

        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([account])))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetAccountsTool::new(handle_for(&server));
        let result = tool.execute(&json!({})).await.unwrap();
        assert!(result.starts_with("Retrieved 1 accounts:\n["));
        assert!(result.contains("\"id\": \"acct_1\""));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let tool = GetAccountTool::new(ClientHandle::new());
        let err = tool.execute(&json!({"account_id": "acct_1"})).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ToolError>(), Some(&ToolError::NotConfigured));
    }

    #[tokio::test]
    async fn test_get_account_requires_id() {
        let server = MockServer::start().await;
        let tool = GetAccountTool::new(handle_for(&server));

        let err = tool.execute(&json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "account_id is required");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_account_passes_key_and_reports_it() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts"))
            .and(header("idempotency-key", "acme-onboarding"))
            .and(body_partial_json(json!({"business_name": "Acme", "ein": "12-3456789"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "acct_9"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut args = account_args();
        args["idempotency_key"] = json!("acme-onboarding");

        let tool = CreateAccountTool::new(handle_for(&server));
        let result = tool.execute(&args).await.unwrap();
        assert!(result.starts_with("Account created (idempotency key: acme-onboarding):"));
        assert!(result.contains("acct_9"));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("idempotency_key").is_none());
    }

    #[tokio::test]
    async fn test_create_account_surfaces_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "invalid_ein"})))
            .mount(&server)
            .await;

        let tool = CreateAccountTool::new(handle_for(&server));
        let err = tool.execute(&account_args()).await.unwrap_err();
        assert_eq!(err.to_string(), r#"HTTP 422: {"error":"invalid_ein"}"#);
        assert!(err.downcast_ref::<ToolError>().is_none());
    }

    #[tokio::test]
    async fn test_create_account_rejects_incomplete_payload() {
        let server = MockServer::start().await;
        let tool = CreateAccountTool::new(handle_for(&server));

        let err = tool
            .execute(&json!({"business_name": "Acme"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::InvalidArguments(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
