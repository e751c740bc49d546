//! # brale-client
//!
//! Authenticated request pipeline for the Brale API.
//!
//! - [`TokenManager`] caches a bearer token and refreshes it with the OAuth2
//!   client-credentials grant shortly before it expires.
//! - [`Dispatcher`] attaches that token to every call and an
//!   `Idempotency-Key` to every create.
//! - [`BraleClient`] exposes one typed method per API operation.
//!
//! Nothing is retried. Every failure surfaces as a [`ClientError`].
//!
//! ## Example
//!
//! ```no_run
//! use brale_client::{BraleClient, Idempotency};
//! use brale_common::{AddressCreateRequest, BraleConfig};
//!
//! # async fn example() -> Result<(), brale_client::ClientError> {
//! let client = BraleClient::new(BraleConfig::from_env()?)?;
//!
//! let created = client
//!     .create_external_address(
//!         "acct_1",
//!         &AddressCreateRequest {
//!             name: "Treasury".to_string(),
//!             transfer_types: vec!["solana".to_string()],
//!             address: "So1ana...".to_string(),
//!         },
//!         Idempotency::Generate,
//!     )
//!     .await?;
//! println!("created address {}", created.id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;

pub use auth::{TokenManager, TokenResponse};
pub use client::BraleClient;
pub use dispatch::{
    ApiRequest, Dispatcher, IDEMPOTENCY_KEY_HEADER, Idempotency, generate_idempotency_key,
    validate_idempotency_key,
};
pub use error::ClientError;
