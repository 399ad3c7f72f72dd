use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::BackendError;

/// Source of bearer tokens for the backend
///
/// Implementations own token lifetime, including any refresh and the
/// locking it needs. The engine asks for a token before every call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid token, or `None` for backends that need no auth
    async fn valid_token(&self) -> Result<Option<SecretString>, BackendError>;
}

/// Token fixed at startup from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<SecretString>,
}

impl StaticTokenProvider {
    pub const fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn valid_token(&self) -> Result<Option<SecretString>, BackendError> {
        Ok(self.token.clone())
    }
}
