use crate::core::{ParameterStore, SecretStore};
use crate::utils::error::{NotifyError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use aws_sdk_ssm::error::{DisplayErrorContext, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::Client as SsmClient;

/// Loads the shared SDK configuration for `region`.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: SsmClient,
}

impl SsmParameterStore {
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(SsmClient::new(config))
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let result = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match result {
            Ok(output) => output
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)
                .ok_or_else(|| NotifyError::ParameterStoreError {
                    message: format!("parameter '{}' has no value", name),
                }),
            Err(err) => Err(map_get_parameter_error(name, err)),
        }
    }
}

/// SSM's `ParameterNotFound` becomes [`NotifyError::ParameterNotFound`];
/// everything else (throttling, access denied, timeouts) is a store error.
pub(crate) fn map_get_parameter_error<R>(
    name: &str,
    err: SdkError<GetParameterError, R>,
) -> NotifyError
where
    R: std::fmt::Debug + 'static,
{
    let not_found = err
        .as_service_error()
        .map(|e| e.is_parameter_not_found())
        .unwrap_or(false);
    if not_found {
        return NotifyError::ParameterNotFound {
            name: name.to_string(),
        };
    }

    NotifyError::ParameterStoreError {
        message: format!(
            "Failed to get parameter '{}': {}",
            name,
            DisplayErrorContext(&err)
        ),
    }
}

#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: SecretsManagerClient,
}

impl SecretsManagerStore {
    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(SecretsManagerClient::new(config))
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret_string(&self, secret_id: &str) -> Result<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| NotifyError::SecretStoreError {
                message: format!(
                    "Failed to get secret '{}': {}",
                    secret_id,
                    aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
                ),
            })?;

        let secret_string = output
            .secret_string()
            .ok_or_else(|| NotifyError::SecretFormatError {
                secret_id: secret_id.to_string(),
                reason: "secret has no SecretString".to_string(),
            })?;

        tracing::debug!(
            secret_id = %secret_id,
            version = ?output.version_id(),
            "Secret loaded from Secrets Manager"
        );

        Ok(secret_string.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::types::error::{InternalServerError, ParameterNotFound};

    #[test]
    fn test_parameter_not_found_maps_to_not_found() {
        let err: SdkError<GetParameterError, ()> = SdkError::service_error(
            GetParameterError::ParameterNotFound(ParameterNotFound::builder().build()),
            (),
        );
        let mapped = map_get_parameter_error("/user/s3-user/email", err);
        assert!(matches!(
            mapped,
            NotifyError::ParameterNotFound { ref name } if name == "/user/s3-user/email"
        ));
    }

    #[test]
    fn test_other_service_error_maps_to_store_error() {
        let err: SdkError<GetParameterError, ()> = SdkError::service_error(
            GetParameterError::InternalServerError(
                InternalServerError::builder()
                    .message("AccessDeniedException")
                    .build(),
            ),
            (),
        );
        let mapped = map_get_parameter_error("/user/s3-user/email", err);
        assert!(matches!(mapped, NotifyError::ParameterStoreError { .. }));
        assert!(!mapped.is_parameter_not_found());
    }

    #[test]
    fn test_timeout_maps_to_store_error() {
        let err: SdkError<GetParameterError, ()> = SdkError::timeout_error("deadline exceeded");
        let mapped = map_get_parameter_error("/user/s3-user/email", err);
        assert!(matches!(
            mapped,
            NotifyError::ParameterStoreError { ref message } if message.contains("/user/s3-user/email")
        ));
    }
}
