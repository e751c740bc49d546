//! Brale API resource models.
//!
//! Every response is validated once, at the client boundary, by
//! deserializing into these types. Optional wire fields are explicit
//! `Option`s; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Postal address used by accounts, controllers and bank details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountAddress {
    pub street_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Person with significant control over a business account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessController {
    pub name: String,
    pub ssn: String,
    pub address: AccountAddress,
}

/// A business account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub status: String,
    pub business_name: String,
    pub ein: String,
    pub business_type: String,
    pub address: AccountAddress,
    pub phone_number: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub business_controller: BusinessController,
}

/// Payload for `POST /accounts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCreateRequest {
    pub business_name: String,
    pub ein: String,
    pub business_type: String,
    pub address: AccountAddress,
    pub phone_number: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub business_controller: BusinessController,
}

/// Source or destination of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferEndpoint {
    /// Currency or token, e.g. `USD` or `SBC`.
    pub value_type: String,
    /// Rail or chain, e.g. `wire` or `solana`.
    pub transfer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_institution_id: Option<String>,
}

/// A transfer between two endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub status: String,
    pub amount: String,
    pub created_at: String,
    pub updated_at: String,
    pub source: TransferEndpoint,
    pub destination: TransferEndpoint,
    #[serde(
        rename = "gasFee",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_fee: Option<String>,
}

/// Amount of a requested transfer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    /// Decimal amount as a string, e.g. `"100.00"`.
    pub value: String,
    pub currency: String,
}

/// Payload for `POST /accounts/{id}/transfers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferCreateRequest {
    pub amount: Amount,
    pub source: TransferEndpoint,
    pub destination: TransferEndpoint,
}

/// An on-chain or custodial address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub id: String,
    pub status: String,
    pub name: String,
    pub address: String,
    pub transfer_types: Vec<String>,
}

/// Response of `GET /accounts/{id}/addresses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressList {
    pub addresses: Vec<Address>,
}

/// Balance of one value type held at an address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub balance: String,
    pub value_type: String,
}

/// Response of the address balance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressBalances {
    pub status: String,
    pub name: String,
    pub address: String,
    pub transfer_types: Vec<String>,
    pub balances: Vec<Balance>,
}

/// Payload for `POST /accounts/{id}/addresses/external`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressCreateRequest {
    pub name: String,
    pub transfer_types: Vec<String>,
    pub address: String,
}

/// Bank account details of a financial institution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankDetails {
    pub owner: String,
    pub account_number: String,
    pub routing_number: String,
    pub name: String,
    pub address: AccountAddress,
    pub account_type: String,
}

/// A linked bank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialInstitution {
    pub name: String,
    pub transfer_type: Vec<String>,
    pub bank_details: BankDetails,
}

/// Response of `GET /accounts/{id}/financial-institutions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialInstitutionList {
    pub financial_institutions: Vec<FinancialInstitution>,
}

/// Payload for `POST /accounts/{id}/financial-institutions/external`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialInstitutionCreateRequest {
    pub name: String,
    pub transfer_type: Vec<String>,
    pub bank_details: BankDetails,
}

/// Where an automation delivers minted funds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutomationDestinationAddress {
    pub address_id: String,
    pub value_type: String,
    pub transfer_type: String,
}

/// Wire instructions issued for an automation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireInstructions {
    pub bank_beneficiary_name: String,
    pub bank_name: String,
    pub bank_address: String,
    pub bank_beneficiary: String,
    pub bank_account_number: String,
    pub bank_routing_number: String,
}

/// A deposit automation.
///
/// The API reports the destination as `destinationAddress`; requests use
/// `destination_address`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Automation {
    pub name: String,
    pub status: String,
    pub wire_instructions: WireInstructions,
    #[serde(rename = "destinationAddress", alias = "destination_address")]
    pub destination_address: AutomationDestinationAddress,
}

/// Response of `GET /accounts/{id}/automations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutomationList {
    pub automations: Vec<Automation>,
}

/// Payload for `POST /accounts/{id}/automations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutomationCreateRequest {
    pub name: String,
    pub destination_address: AutomationDestinationAddress,
}

/// Response of every create call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Created {
    pub id: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn address_json() -> serde_json::Value {
        json!({
            "street_line_1": "1 Main St",
            "city": "Des Moines",
            "state": "IA",
            "zip": "50309",
            "country": "US"
        })
    }

    #[test]
    fn test_account_ignores_unknown_fields() {
        let account: Account = serde_json::from_value(json!({
            "id": "acct_1",
            "status": "complete",
            "business_name": "Acme",
            "ein": "12-3456789",
            "business_type": "llc",
            "address": address_json(),
            "phone_number": "+15555550100",
            "email": "ops@acme.test",
            "business_controller": {
                "name": "Jo Doe",
                "ssn": "000-00-0000",
                "address": address_json()
            },
            "created": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(account.id, "acct_1");
        assert!(account.website.is_none());
        assert!(account.address.street_line_2.is_none());
    }

    #[test]
    fn test_transfer_gas_fee_wire_name() {
        let transfer: Transfer = serde_json::from_value(json!({
            "status": "complete",
            "amount": "10.00",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:05:00Z",
            "source": {"value_type": "USD", "transfer_type": "wire"},
            "destination": {
                "value_type": "SBC",
                "transfer_type": "solana",
                "address_id": "addr_1",
                "financial_institution_id": null
            },
            "gasFee": "0.01"
        }))
        .unwrap();

        assert_eq!(transfer.gas_fee.as_deref(), Some("0.01"));
        assert_eq!(transfer.destination.address_id.as_deref(), Some("addr_1"));
        assert!(transfer.destination.financial_institution_id.is_none());

        let back = serde_json::to_value(&transfer).unwrap();
        assert_eq!(back["gasFee"], "0.01");
        assert!(back["source"].get("address_id").is_none());
    }

    #[test]
    fn test_automation_destination_wire_names() {
        let destination = json!({
            "address_id": "addr_1",
            "value_type": "SBC",
            "transfer_type": "solana"
        });
        let wire = json!({
            "bank_beneficiary_name": "Brale",
            "bank_name": "Bank",
            "bank_address": "1 Bank St",
            "bank_beneficiary": "Brale Inc",
            "bank_account_number": "123",
            "bank_routing_number": "456"
        });

        let automation: Automation = serde_json::from_value(json!({
            "name": "Payroll",
            "status": "active",
            "wire_instructions": wire,
            "destinationAddress": destination
        }))
        .unwrap();
        assert_eq!(automation.destination_address.address_id, "addr_1");

        let request = AutomationCreateRequest {
            name: "Payroll".to_string(),
            destination_address: automation.destination_address,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["destination_address"], destination);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let result = serde_json::from_value::<Address>(json!({
            "id": "addr_1",
            "status": "active",
            "name": "Treasury"
        }));
        assert!(result.is_err());
    }
}
