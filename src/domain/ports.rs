use crate::utils::error::Result;
use async_trait::async_trait;

/// Key/value parameter lookup (SSM Parameter Store in production).
///
/// Implementations must report an absent key as
/// [`NotifyError::ParameterNotFound`](crate::utils::error::NotifyError::ParameterNotFound)
/// so callers can tell it apart from transport or permission failures.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String>;
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the raw secret string stored under `secret_id`.
    async fn get_secret_string(&self, secret_id: &str) -> Result<String>;
}
