//! Typed Brale API client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::de::DeserializeOwned;
use serde_json::Value;

use brale_common::{
    Account, AccountCreateRequest, AddressBalances, AddressCreateRequest, AddressList, Automation,
    AutomationCreateRequest, AutomationList, BraleConfig, Created, FinancialInstitution,
    FinancialInstitutionCreateRequest, FinancialInstitutionList, Transfer, TransferCreateRequest,
};

use crate::auth::TokenManager;
use crate::dispatch::{ApiRequest, Dispatcher, Idempotency};
use crate::error::ClientError;

/// Client for the Brale API.
///
/// Cheap to clone; clones share the HTTP connection pool and the token cache.
///
/// # Examples
///
/// ```no_run
/// use brale_client::BraleClient;
/// use brale_common::BraleConfig;
///
/// # async fn example() -> Result<(), brale_client::ClientError> {
/// let config = BraleConfig::new().with_client_credentials("client-id", "client-secret");
/// let client = BraleClient::new(config)?;
///
/// for account in client.get_accounts().await? {
///     println!("{} ({})", account.business_name, account.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BraleClient {
    config: Arc<BraleConfig>,
    dispatcher: Dispatcher,
}

impl fmt::Debug for BraleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraleClient")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl BraleClient {
    /// Create a new client.
    ///
    /// Credentials are not checked here; a client without any usable
    /// credential fails on its first call with
    /// [`ClientError::AuthConfiguration`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if a URL is invalid, the timeout
    /// is zero, or the HTTP client cannot be built.
    pub fn new(config: BraleConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let tokens = Arc::new(TokenManager::new(http.clone(), &config));
        let dispatcher = Dispatcher::new(http, &config.base_url, tokens)?;

        info!(
            "Brale client created (base_url: {}, auth_url: {})",
            config.base_url, config.auth_url
        );

        Ok(Self {
            config: Arc::new(config),
            dispatcher,
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &BraleConfig {
        &self.config
    }

    /// The token manager shared by all clones of this client.
    #[must_use]
    pub fn token_manager(&self) -> &TokenManager {
        self.dispatcher.tokens()
    }

    /// Sends a request and returns the untyped JSON body.
    ///
    /// Escape hatch for endpoints without a typed method.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::send`].
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.dispatcher.send(request).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        what: &str,
    ) -> Result<T, ClientError> {
        let body = self.dispatcher.send(request).await?;
        serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("unexpected {what} payload: {e}")))
    }

    // Accounts

    /// `GET /accounts`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_accounts(&self) -> Result<Vec<Account>, ClientError> {
        self.fetch(ApiRequest::get(["accounts"]), "account list").await
    }

    /// `GET /accounts/{account_id}`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_account(&self, account_id: &str) -> Result<Account, ClientError> {
        self.fetch(ApiRequest::get(["accounts", account_id]), "account")
            .await
    }

    /// `POST /accounts`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn create_account(
        &self,
        request: &AccountCreateRequest,
        idempotency: Idempotency,
    ) -> Result<Created, ClientError> {
        let request = ApiRequest::post(["accounts"], request, idempotency)?;
        self.fetch(request, "create account").await
    }

    // Transfers

    /// `GET /accounts/{account_id}/transfers`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_transfers(&self, account_id: &str) -> Result<Vec<Transfer>, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "transfers"]),
            "transfer list",
        )
        .await
    }

    /// `GET /accounts/{account_id}/transfers/{transfer_id}`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_transfer(
        &self,
        account_id: &str,
        transfer_id: &str,
    ) -> Result<Transfer, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "transfers", transfer_id]),
            "transfer",
        )
        .await
    }

    /// `POST /accounts/{account_id}/transfers`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn create_transfer(
        &self,
        account_id: &str,
        request: &TransferCreateRequest,
        idempotency: Idempotency,
    ) -> Result<Created, ClientError> {
        let request =
            ApiRequest::post(["accounts", account_id, "transfers"], request, idempotency)?;
        self.fetch(request, "create transfer").await
    }

    // Addresses

    /// `GET /accounts/{account_id}/addresses`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_addresses(&self, account_id: &str) -> Result<AddressList, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "addresses"]),
            "address list",
        )
        .await
    }

    /// `GET /accounts/{account_id}/addresses/{address_id}/balance`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_address_balances(
        &self,
        account_id: &str,
        address_id: &str,
        transfer_type: &str,
        value_type: &str,
    ) -> Result<AddressBalances, ClientError> {
        let request =
            ApiRequest::get(["accounts", account_id, "addresses", address_id, "balance"])
                .query("transfer_type", transfer_type)
                .query("value_type", value_type);
        self.fetch(request, "address balance").await
    }

    /// `POST /accounts/{account_id}/addresses/external`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn create_external_address(
        &self,
        account_id: &str,
        request: &AddressCreateRequest,
        idempotency: Idempotency,
    ) -> Result<Created, ClientError> {
        let request = ApiRequest::post(
            ["accounts", account_id, "addresses", "external"],
            request,
            idempotency,
        )?;
        self.fetch(request, "create address").await
    }

    // Financial institutions

    /// `GET /accounts/{account_id}/financial-institutions`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_financial_institutions(
        &self,
        account_id: &str,
    ) -> Result<FinancialInstitutionList, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "financial-institutions"]),
            "financial institution list",
        )
        .await
    }

    /// `GET /accounts/{account_id}/financial-institutions/{institution_id}`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_financial_institution(
        &self,
        account_id: &str,
        institution_id: &str,
    ) -> Result<FinancialInstitution, ClientError> {
        self.fetch(
            ApiRequest::get([
                "accounts",
                account_id,
                "financial-institutions",
                institution_id,
            ]),
            "financial institution",
        )
        .await
    }

    /// `POST /accounts/{account_id}/financial-institutions/external`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn create_external_financial_institution(
        &self,
        account_id: &str,
        request: &FinancialInstitutionCreateRequest,
        idempotency: Idempotency,
    ) -> Result<Created, ClientError> {
        let request = ApiRequest::post(
            ["accounts", account_id, "financial-institutions", "external"],
            request,
            idempotency,
        )?;
        self.fetch(request, "create financial institution").await
    }

    // Automations

    /// `GET /accounts/{account_id}/automations`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_automations(&self, account_id: &str) -> Result<AutomationList, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "automations"]),
            "automation list",
        )
        .await
    }

    /// `GET /accounts/{account_id}/automations/{automation_id}`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn get_automation(
        &self,
        account_id: &str,
        automation_id: &str,
    ) -> Result<Automation, ClientError> {
        self.fetch(
            ApiRequest::get(["accounts", account_id, "automations", automation_id]),
            "automation",
        )
        .await
    }

    /// `POST /accounts/{account_id}/automations`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`] from the request pipeline.
    pub async fn create_automation(
        &self,
        account_id: &str,
        request: &AutomationCreateRequest,
        idempotency: Idempotency,
    ) -> Result<Created, ClientError> {
        let request =
            ApiRequest::post(["accounts", account_id, "automations"], request, idempotency)?;
        self.fetch(request, "create automation").await
    }
}
