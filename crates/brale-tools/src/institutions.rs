use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use brale_client::Idempotency;
use brale_common::{FinancialInstitutionCreateRequest, Property, Tool};

use crate::ToolImplementation;
use crate::args::{idempotency_key, payload, pretty, required_strs};
use crate::handle::ClientHandle;
use crate::schema::{self, definition};

pub struct GetFinancialInstitutionsTool {
    handle: ClientHandle,
}

impl GetFinancialInstitutionsTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetFinancialInstitutionsTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_financial_institutions",
            "Retrieve all linked financial institutions for a specific account",
            vec![schema::account_id()],
            &["account_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let institutions = client.get_financial_institutions(account_id).await?;

        Ok(format!(
            "Retrieved financial institutions for account {account_id}:\n{}",
            pretty(&institutions)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

pub struct GetFinancialInstitutionTool {
    handle: ClientHandle,
}

impl GetFinancialInstitutionTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for GetFinancialInstitutionTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_get_financial_institution",
            "Retrieve a specific financial institution by ID",
            vec![
                schema::account_id(),
                (
                    "financial_institution_id",
                    Property::string("The ID of the financial institution to retrieve"),
                ),
            ],
            &["account_id", "financial_institution_id"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id, institution_id] =
            required_strs(args, ["account_id", "financial_institution_id"])?;
        let institution = client
            .get_financial_institution(account_id, institution_id)
            .await?;

        Ok(format!(
            "Financial institution details:\n{}",
            pretty(&institution)?
        ))
    }

    fn is_auto_approved(&self) -> bool {
        true
    }
}

/// Links an external bank account for fiat deposits and redemptions.
pub struct CreateExternalFinancialInstitutionTool {
    handle: ClientHandle,
}

impl CreateExternalFinancialInstitutionTool {
    #[must_use]
    pub const fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ToolImplementation for CreateExternalFinancialInstitutionTool {
    fn get_definition(&self) -> Tool {
        definition(
            "brale_create_external_financial_institution",
            "Link an external bank account to an account",
            vec![
                schema::account_id(),
                ("name", Property::string("Display name for the bank account")),
                (
                    "transfer_type",
                    Property::string_array("Rails the bank account is used on, e.g. [\"wire\", \"ach\"]"),
                ),
                ("bank_details", schema::bank_details()),
                schema::idempotency_key(),
            ],
            &["account_id", "name", "transfer_type", "bank_details"],
        )
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let client = self.handle.client().await?;
        let [account_id] = required_strs(args, ["account_id"])?;
        let request: FinancialInstitutionCreateRequest =
            payload(args, "financial institution")?;
        let key = idempotency_key(args)?;

        let created = client
            .create_external_financial_institution(
                account_id,
                &request,
                Idempotency::Supplied(key.clone()),
            )
            .await?;

        Ok(format!(
            "Financial institution created for account {account_id} (idempotency key: {key}):\n{}",
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
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn handle_for(server: &MockServer) -> ClientHandle {
        let config = BraleConfig::new()
            .with_base_url(server.uri())
            .with_bearer_token("tok");
        ClientHandle::with_client(BraleClient::new(config).unwrap())
    }

    fn bank_details() -> Value {
        json!({
            "owner": "Acme LLC",
            "account_number": "000123",
            "routing_number": "111000025",
            "name": "First Bank",
            "address": {
                "street_line_1": "2 Bank Plaza",
                "city": "Des Moines",
                "state": "IA",
                "zip": "50309",
                "country": "US"
            },
            "account_type": "checking"
        })
    }

    #[tokio::test]
    async fn test_get_financial_institution_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acct_1/financial-institutions/fi_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Operating",
                "transfer_type": ["wire"],
                "bank_details": bank_details()
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = GetFinancialInstitutionTool::new(handle_for(&server));
        let result = tool
            .execute(&json!({"account_id": "acct_1", "financial_institution_id": "fi_1"}))
            .await
            .unwrap();
        assert!(result.starts_with("Financial institution details:\n"));
        assert!(result.contains("First Bank"));
    }

    #[tokio::test]
    async fn test_get_financial_institutions_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/missing/financial-institutions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not_found"})))
            .mount(&server)
            .await;

        let tool = GetFinancialInstitutionsTool::new(handle_for(&server));
        let err = tool
            .execute(&json!({"account_id": "missing"}))
            .await
            .unwrap_err();
        let client_err = err.downcast_ref::<brale_client::ClientError>().unwrap();
        assert_eq!(client_err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_create_external_financial_institution() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts/acct_1/financial-institutions/external"))
            .and(header_exists("idempotency-key"))
            .and(body_partial_json(json!({"name": "Operating", "transfer_type": ["wire"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "fi_2"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CreateExternalFinancialInstitutionTool::new(handle_for(&server));
        let result = tool
            .execute(&json!({
                "account_id": "acct_1",
                "name": "Operating",
                "transfer_type": ["wire"],
                "bank_details": bank_details()
            }))
            .await
            .unwrap();
        assert!(result.starts_with("Financial institution created for account acct_1"));
        assert!(result.contains("fi_2"));
    }
}
