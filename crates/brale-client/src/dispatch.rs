//! Authenticated request dispatch.
//!
//! [`Dispatcher::send`] is the single path every API call takes: it obtains a
//! valid token from the [`TokenManager`], attaches it as a bearer header,
//! adds an `Idempotency-Key` to mutating calls, and maps the response into
//! either the parsed JSON body or a [`ClientError`].

use std::fmt;
use std::sync::Arc;

use log::{debug, error};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::auth::TokenManager;
use crate::error::ClientError;

/// Header carrying the idempotency key of a mutating request.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Generates a fresh idempotency key.
///
/// UUID v7: a millisecond timestamp followed by random bits, so keys
/// generated within the same millisecond still differ.
#[must_use]
pub fn generate_idempotency_key() -> String {
    Uuid::now_v7().to_string()
}

/// Checks that `key` can be sent as an idempotency key.
///
/// Keys must be non-blank and valid as an HTTP header value.
///
/// # Errors
///
/// Returns [`ClientError::InvalidIdempotencyKey`] otherwise.
pub fn validate_idempotency_key(key: &str) -> Result<HeaderValue, ClientError> {
    if key.trim().is_empty() {
        return Err(ClientError::InvalidIdempotencyKey(
            "key must not be empty".to_string(),
        ));
    }
    HeaderValue::from_str(key).map_err(|_| {
        ClientError::InvalidIdempotencyKey(
            "key contains characters not allowed in an HTTP header".to_string(),
        )
    })
}

/// How a mutating request obtains its idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Idempotency {
    /// Generate a fresh key for this request.
    #[default]
    Generate,
    /// Use the caller's key unchanged. Checked when the request is built.
    Supplied(String),
}

impl Idempotency {
    /// Uses `key` when it is present and non-blank, otherwise generates one.
    #[must_use]
    pub fn from_option(key: Option<String>) -> Self {
        match key {
            Some(key) if !key.trim().is_empty() => Self::Supplied(key),
            _ => Self::Generate,
        }
    }

    /// Resolves to the concrete header value.
    #[must_use]
    pub fn into_key(self) -> String {
        match self {
            Self::Supplied(key) => key,
            Self::Generate => generate_idempotency_key(),
        }
    }
}

impl From<Option<String>> for Idempotency {
    fn from(key: Option<String>) -> Self {
        Self::from_option(key)
    }
}

/// One outbound API call.
///
/// Reads are built with [`ApiRequest::get`]; mutating calls with
/// [`ApiRequest::post`], which requires an [`Idempotency`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    idempotency_key: Option<HeaderValue>,
}

impl ApiRequest {
    /// A read-only request to the given path segments.
    ///
    /// Segments are percent-encoded individually.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::GET,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    /// A create request with a JSON body.
    ///
    /// The idempotency key is resolved here, so a generated key is fixed for
    /// the lifetime of this request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Serialization`] if the body cannot be encoded
    /// - [`ClientError::InvalidIdempotencyKey`] for a blank supplied key or
    ///   one that is not a valid header value
    pub fn post<I, S, B>(segments: I, body: &B, idempotency: Idempotency) -> Result<Self, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        B: Serialize + ?Sized,
    {
        let key = validate_idempotency_key(&idempotency.into_key())?;

        Ok(Self {
            method: Method::POST,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
            idempotency_key: Some(key),
        })
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// HTTP method of this request.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Idempotency key sent with this request, if it is a create.
    #[must_use]
    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_ref().and_then(|key| key.to_str().ok())
    }

    /// Unencoded path, for logging.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Sends authenticated requests to the Brale API.
#[derive(Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenManager>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url.as_str())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if `base_url` is not an
    /// absolute URL that can carry a path.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        tokens: Arc<TokenManager>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Configuration(format!("Invalid URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "Base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// The token manager backing this dispatcher.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Configuration(format!(
                    "Base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }

    /// Sends `request` and returns the parsed response body.
    ///
    /// An empty 2xx body is returned as `Value::Null`.
    ///
    /// # Errors
    ///
    /// - Token errors from [`TokenManager::ensure_valid_token`]
    /// - [`ClientError::Transport`] on network failure
    /// - [`ClientError::Http`] for any non-2xx status, with the body verbatim
    /// - [`ClientError::InvalidResponse`] when a 2xx body is not JSON
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.url_for(&request)?;
        let path = request.path();
        let token = self.tokens.ensure_valid_token().await?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));

        if let Some(key) = &request.idempotency_key {
            debug!(
                "{} {path} (idempotency key {})",
                request.method,
                String::from_utf8_lossy(key.as_bytes())
            );
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key.clone());
        } else {
            debug!("{} {path}", request.method);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("{} {path} failed: {e}", request.method);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            error!(
                "Brale API request {} {path} failed with status {}: {body}",
                request.method,
                status.as_u16()
            );
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            "{} {path} returned {} ({} bytes)",
            request.method,
            status.as_u16(),
            text.len()
        );

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("{} {path}: {e}", request.method))
        })
    }
}
