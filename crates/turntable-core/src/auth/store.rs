//! Credential storage.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;

use super::Tokens;

/// Where the client keeps its bearer tokens between requests.
///
/// Implementations are expected to be cheap: every authenticated request
/// loads the current tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored tokens, if any.
    async fn load(&self) -> Result<Option<Tokens>>;

    /// Replace the stored tokens.
    async fn save(&self, tokens: Tokens) -> Result<()>;

    /// Forget the stored tokens.
    async fn clear(&self) -> Result<()>;
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: RwLock<Option<Tokens>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given tokens.
    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Tokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn save(&self, tokens: Tokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
