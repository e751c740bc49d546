//! # brale-common
//!
//! Shared types for the Brale API adapter:
//! - Client configuration with secret-safe credential storage
//! - Resource models for accounts, transfers, addresses, financial
//!   institutions and automations
//! - Tool definition types advertised to tool-calling hosts
//!
//! ## Example
//!
//! ```
//! use brale_common::{BraleConfig, Function, Parameters, Tool};
//!
//! let config = BraleConfig::new().with_bearer_token("token");
//! assert!(config.missing_credentials().is_empty());
//!
//! let tool = Tool::builder()
//!     .function(Function {
//!         name: "brale_get_accounts".to_string(),
//!         description: "Retrieve all accounts from Brale API".to_string(),
//!         parameters: Parameters::empty().into(),
//!     })
//!     .build();
//! assert_eq!(tool.r#type, "function");
//! ```

/// Client configuration and credential handling.
pub mod config;
/// Request and response payloads of the Brale API.
pub mod models;
/// Tool definition and input schema types.
pub mod tools;

pub use config::{BraleConfig, ConfigError, DEFAULT_AUTH_URL, DEFAULT_BASE_URL};
pub use models::{
    Account, AccountAddress, AccountCreateRequest, Address, AddressBalances, AddressCreateRequest,
    AddressList, Amount, Automation, AutomationCreateRequest, AutomationDestinationAddress,
    AutomationList, Balance, BankDetails, BusinessController, Created, FinancialInstitution,
    FinancialInstitutionCreateRequest, FinancialInstitutionList, Transfer, TransferCreateRequest,
    TransferEndpoint, WireInstructions,
};
pub use tools::{Function, ItemSchema, ObjectSchema, Parameters, Property, Tool};
