use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Parameter not found: {name}")]
    ParameterNotFound { name: String },

    #[error("Parameter store error: {message}")]
    ParameterStoreError { message: String },

    #[error("Secret store error: {message}")]
    SecretStoreError { message: String },

    #[error("Secret '{secret_id}' is malformed: {reason}")]
    SecretFormatError { secret_id: String, reason: String },

    #[error("Malformed event: {0}")]
    EventError(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{kind} '{name}' referenced by '{referenced_by}' does not exist")]
    UnresolvedReference {
        kind: String,
        name: String,
        referenced_by: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lookup,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NotifyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NotifyError::ParameterNotFound { .. }
            | NotifyError::ParameterStoreError { .. }
            | NotifyError::SecretStoreError { .. }
            | NotifyError::SecretFormatError { .. } => ErrorCategory::Lookup,
            NotifyError::EventError(_) | NotifyError::SerializationError(_) => {
                ErrorCategory::Input
            }
            NotifyError::TomlError(_)
            | NotifyError::ConfigError { .. }
            | NotifyError::MissingConfigError { .. }
            | NotifyError::InvalidConfigValueError { .. }
            | NotifyError::ValidationError { .. }
            | NotifyError::UnresolvedReference { .. } => ErrorCategory::Configuration,
            NotifyError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 通知流程會以 sentinel 取代，不算失敗
            NotifyError::ParameterNotFound { .. } => ErrorSeverity::Low,
            NotifyError::ParameterStoreError { .. } | NotifyError::SecretStoreError { .. } => {
                ErrorSeverity::Medium
            }
            NotifyError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_parameter_not_found(&self) -> bool {
        matches!(self, NotifyError::ParameterNotFound { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            NotifyError::ParameterNotFound { name } => {
                format!("Create the parameter '{}' or check the key template", name)
            }
            NotifyError::ParameterStoreError { .. } => {
                "Check the function role allows ssm:GetParameter".to_string()
            }
            NotifyError::SecretStoreError { .. } => {
                "Check SECRET_ID and that the role allows secretsmanager:GetSecretValue"
                    .to_string()
            }
            NotifyError::SecretFormatError { .. } => {
                "The secret string must be a JSON object with a 'password' field".to_string()
            }
            NotifyError::EventError(_) => {
                "The event must contain detail.requestParameters.userName".to_string()
            }
            NotifyError::UnresolvedReference { kind, .. } => {
                format!("Declare the missing {} in the stack manifest", kind.to_lowercase())
            }
            NotifyError::TomlError(_)
            | NotifyError::ConfigError { .. }
            | NotifyError::MissingConfigError { .. }
            | NotifyError::InvalidConfigValueError { .. }
            | NotifyError::ValidationError { .. } => {
                "Fix the configuration and run `iam-onboard validate` again".to_string()
            }
            NotifyError::IoError(_) | NotifyError::SerializationError(_) => {
                "Check file paths and permissions".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Lookup => format!("Lookup failed: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_not_found_is_low_severity() {
        let err = NotifyError::ParameterNotFound {
            name: "/user/bob/email".to_string(),
        };
        assert!(err.is_parameter_not_found());
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Lookup);
        assert!(err.recovery_suggestion().contains("/user/bob/email"));
    }

    #[test]
    fn test_unresolved_reference_message() {
        let err = NotifyError::UnresolvedReference {
            kind: "Group".to_string(),
            name: "Admins".to_string(),
            referenced_by: "alice".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Group 'Admins' referenced by 'alice' does not exist"
        );
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_parameter_not_found());
    }
}
