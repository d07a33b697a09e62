use crate::core::{ParameterStore, SecretStore};
use crate::utils::error::{NotifyError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Parameter store backed by a map; used by `simulate` and in tests.
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn put(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .get(name)
            .cloned()
            .ok_or_else(|| NotifyError::ParameterNotFound {
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `{"password": "<password>"}` under `secret_id`.
    pub fn with_password(secret_id: impl Into<String>, password: &str) -> Self {
        let store = Self::new();
        store.put(
            secret_id,
            serde_json::json!({ "password": password }).to_string(),
        );
        store
    }

    pub fn put(&self, secret_id: impl Into<String>, secret_string: impl Into<String>) {
        self.secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(secret_id.into(), secret_string.into());
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret_string(&self, secret_id: &str) -> Result<String> {
        let secrets = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
        secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| NotifyError::SecretStoreError {
                message: format!("secret '{}' does not exist", secret_id),
            })
    }
}
