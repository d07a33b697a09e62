use crate::utils::error::{NotifyError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Placeholder substituted with the user name in parameter key templates.
pub const USER_NAME_PLACEHOLDER: &str = "{user_name}";

fn iam_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // IAM user / group / policy 名稱允許的字元
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+=,.@_-]+$").expect("static regex"))
}

fn parameter_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(/[A-Za-z0-9_.\-{}]+)+$").expect("static regex"))
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| NotifyError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// IAM names: 1-64 characters from `[A-Za-z0-9+=,.@_-]`.
pub fn validate_iam_name(field_name: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Name must be between 1 and 64 characters".to_string(),
        });
    }

    if !iam_name_regex().is_match(name) {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Name can only contain letters, digits and +=,.@_-".to_string(),
        });
    }

    Ok(())
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.trim().is_empty() && !domain.trim().is_empty() && !email.contains(' ')
        }
        _ => false,
    };

    if !valid {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: email.to_string(),
            reason: "Email must have exactly one '@' with text on both sides".to_string(),
        });
    }
    Ok(())
}

/// Validates a parameter key template such as `/user/{user_name}/email`.
pub fn validate_key_template(field_name: &str, template: &str) -> Result<()> {
    if !template.contains(USER_NAME_PLACEHOLDER) {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!("Template must contain {}", USER_NAME_PLACEHOLDER),
        });
    }

    if !parameter_path_regex().is_match(template) {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: "Template must be an absolute parameter path like /a/b".to_string(),
        });
    }

    Ok(())
}

pub fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with(['-', '.']) || bucket_name.ends_with(['-', '.']) {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must start and end with a letter or number".to_string(),
        });
    }

    Ok(())
}

/// Operation prefixes that only read state.
const READ_ONLY_PREFIXES: &[&str] = &["Get", "List", "Describe", "Head", "Lookup", "Search"];

/// Accepts `service:Operation` where the operation is a read (`s3:Get*`,
/// `ec2:DescribeInstances`). Bare or service-wide wildcards are rejected.
pub fn validate_read_only_action(field_name: &str, action: &str) -> Result<()> {
    let operation = match action.split_once(':') {
        Some((service, operation)) if !service.is_empty() && !operation.is_empty() => operation,
        _ => {
            return Err(NotifyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: action.to_string(),
                reason: "Action must look like service:Operation".to_string(),
            })
        }
    };

    if !READ_ONLY_PREFIXES.iter().any(|p| operation.starts_with(p)) {
        return Err(NotifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: action.to_string(),
            reason: format!(
                "Only read-only operations are allowed ({})",
                READ_ONLY_PREFIXES.join(", ")
            ),
        });
    }

    Ok(())
}

pub fn validate_unique<'a, I>(field_name: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(NotifyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: "Name is declared more than once".to_string(),
            });
        }
    }
    Ok(())
}
