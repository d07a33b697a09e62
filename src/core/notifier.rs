use crate::core::{Notification, ParameterStore, SecretStore, UserCreatedEvent};
use crate::utils::error::{NotifyError, Result};
use crate::utils::validation::USER_NAME_PLACEHOLDER;

pub const DEFAULT_EMAIL_KEY_TEMPLATE: &str = "/user/{user_name}/email";

#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub secret_id: String,
    pub email_key_template: String,
}

impl NotifierSettings {
    pub fn new(secret_id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            email_key_template: DEFAULT_EMAIL_KEY_TEMPLATE.to_string(),
        }
    }

    pub fn with_email_key_template(mut self, template: impl Into<String>) -> Self {
        self.email_key_template = template.into();
        self
    }
}

pub fn email_parameter_key(template: &str, user_name: &str) -> String {
    template.replace(USER_NAME_PLACEHOLDER, user_name)
}

/// Pulls the `password` field out of a JSON secret string.
pub fn parse_one_time_password(secret_id: &str, secret_string: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(secret_string).map_err(|e| NotifyError::SecretFormatError {
            secret_id: secret_id.to_string(),
            reason: format!("not valid JSON: {}", e),
        })?;

    value
        .get("password")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| NotifyError::SecretFormatError {
            secret_id: secret_id.to_string(),
            reason: "missing string field 'password'".to_string(),
        })
}

/// Looks up the new user's email and the shared one-time password, then
/// writes the notification line.
pub struct Notifier<P: ParameterStore, S: SecretStore> {
    parameters: P,
    secrets: S,
    settings: NotifierSettings,
}

impl<P: ParameterStore, S: SecretStore> Notifier<P, S> {
    pub fn new(parameters: P, secrets: S, settings: NotifierSettings) -> Self {
        Self {
            parameters,
            secrets,
            settings,
        }
    }

    pub fn settings(&self) -> &NotifierSettings {
        &self.settings
    }

    async fn lookup_email(&self, user_name: &str) -> Result<Option<String>> {
        let key = email_parameter_key(&self.settings.email_key_template, user_name);
        tracing::debug!(parameter = %key, "Looking up email parameter");

        match self.parameters.get_parameter(&key).await {
            Ok(email) => Ok(Some(email)),
            Err(e) if e.is_parameter_not_found() => {
                tracing::warn!(parameter = %key, "Email parameter not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup_password(&self) -> Result<String> {
        let secret_id = &self.settings.secret_id;
        tracing::debug!(secret_id = %secret_id, "Fetching one-time password secret");
        let secret_string = self.secrets.get_secret_string(secret_id).await?;
        parse_one_time_password(secret_id, &secret_string)
    }

    pub async fn notify(&self, event: &UserCreatedEvent) -> Result<Notification> {
        let user_name = event.user_name();

        let email = self.lookup_email(user_name).await?;
        let one_time_password = self.lookup_password().await?;

        let notification = Notification {
            user_name: user_name.to_string(),
            email,
            one_time_password,
        };

        tracing::info!(
            user_name = %notification.user_name,
            email_found = notification.email.is_some(),
            "{}",
            notification.log_line()
        );

        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_parameter_key() {
        assert_eq!(
            email_parameter_key(DEFAULT_EMAIL_KEY_TEMPLATE, "s3-user"),
            "/user/s3-user/email"
        );
        assert_eq!(
            email_parameter_key("/team/{user_name}/contact", "bob"),
            "/team/bob/contact"
        );
    }

    #[test]
    fn test_parse_one_time_password() {
        assert_eq!(
            parse_one_time_password("otp", r#"{"password":"Xk29Tq"}"#).unwrap(),
            "Xk29Tq"
        );
        assert!(matches!(
            parse_one_time_password("otp", r#"{"username":"x"}"#),
            Err(NotifyError::SecretFormatError { .. })
        ));
        assert!(matches!(
            parse_one_time_password("otp", "plain-text"),
            Err(NotifyError::SecretFormatError { .. })
        ));
    }
}
