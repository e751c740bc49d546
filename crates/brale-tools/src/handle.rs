use std::sync::Arc;

use tokio::sync::RwLock;

use brale_client::BraleClient;

use crate::error::ToolError;

/// Shared, replaceable slot holding the active [`BraleClient`].
///
/// Every resource tool holds a clone. The configure tools swap the client
/// out; calls already in flight keep the `Arc` they started with.
#[derive(Debug, Clone, Default)]
pub struct ClientHandle {
    slot: Arc<RwLock<Option<Arc<BraleClient>>>>,
}

impl ClientHandle {
    /// An empty handle. Resource tools fail with
    /// [`ToolError::NotConfigured`] until a client is installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that starts out configured.
    #[must_use]
    pub fn with_client(client: BraleClient) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(Arc::new(client)))),
        }
    }

    /// Installs `client`, replacing any previous one.
    pub async fn replace(&self, client: BraleClient) {
        *self.slot.write().await = Some(Arc::new(client));
    }

    pub async fn is_configured(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// The active client.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotConfigured`] if no client has been installed.
    pub async fn client(&self) -> Result<Arc<BraleClient>, ToolError> {
        self.slot
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(ToolError::NotConfigured)
    }
}
