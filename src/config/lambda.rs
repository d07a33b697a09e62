use crate::core::notifier::{NotifierSettings, DEFAULT_EMAIL_KEY_TEMPLATE};
use crate::utils::error::{NotifyError, Result};
use crate::utils::validation::{
    validate_key_template, validate_non_empty_string, validate_required_field, Validate,
};
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub secret_id: String,
    pub email_parameter_template: String,
    pub region: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_id = lookup("SECRET_ID");
        let secret_id = validate_required_field("SECRET_ID", &secret_id)?.clone();

        Ok(Self {
            secret_id,
            email_parameter_template: lookup("EMAIL_PARAMETER_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_EMAIL_KEY_TEMPLATE.to_string()),
            region: lookup("AWS_REGION").unwrap_or_else(|| "ap-southeast-2".to_string()),
        })
    }

    pub fn notifier_settings(&self) -> NotifierSettings {
        NotifierSettings::new(self.secret_id.clone())
            .with_email_key_template(self.email_parameter_template.clone())
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("SECRET_ID", &self.secret_id)?;
        validate_key_template("EMAIL_PARAMETER_TEMPLATE", &self.email_parameter_template)?;

        // AWS region 格式
        if self.region.is_empty()
            || !self
                .region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(NotifyError::InvalidConfigValueError {
                field: "AWS_REGION".to_string(),
                value: self.region.clone(),
                reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                    .to_string(),
            });
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
