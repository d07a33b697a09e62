use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substituted for the email when the user has no email parameter.
pub const EMAIL_NOT_FOUND: &str = "Email not found";

/// EventBridge envelope around a CloudTrail `CreateUser` record.
///
/// Only `detail.requestParameters.userName` is required; the remaining
/// envelope fields are kept when present so the rule pattern can be checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "detail-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub detail: AuditDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub request_parameters: RequestParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub user_name: String,
}

impl UserCreatedEvent {
    /// Builds a minimal event carrying only the user name.
    pub fn for_user(user_name: impl Into<String>) -> Self {
        Self {
            id: None,
            source: None,
            detail_type: None,
            time: None,
            detail: AuditDetail {
                event_source: None,
                event_name: None,
                request_parameters: RequestParameters {
                    user_name: user_name.into(),
                },
            },
        }
    }

    pub fn from_value(value: serde_json::Value) -> crate::utils::error::Result<Self> {
        serde_json::from_value(value).map_err(crate::utils::error::NotifyError::EventError)
    }

    pub fn from_json(raw: &str) -> crate::utils::error::Result<Self> {
        serde_json::from_str(raw).map_err(crate::utils::error::NotifyError::EventError)
    }

    pub fn user_name(&self) -> &str {
        &self.detail.request_parameters.user_name
    }
}

/// Outcome of one notification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub user_name: String,
    /// `None` when the email parameter does not exist.
    pub email: Option<String>,
    pub one_time_password: String,
}

impl Notification {
    pub fn email_or_sentinel(&self) -> &str {
        self.email.as_deref().unwrap_or(EMAIL_NOT_FOUND)
    }

    pub fn log_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User Created: {}, Email: {}, OTP: {}",
            self.user_name,
            self.email_or_sentinel(),
            self.one_time_password
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_event() {
        let event = UserCreatedEvent::from_json(
            r#"{"detail":{"requestParameters":{"userName":"s3-user"}}}"#,
        )
        .unwrap();
        assert_eq!(event.user_name(), "s3-user");
        assert!(event.source.is_none());
        assert!(event.detail.event_name.is_none());
    }

    #[test]
    fn test_parse_full_envelope() {
        let raw = r#"{
            "version": "0",
            "id": "7bf73129-1428-4cd3-a780-95db273d1602",
            "detail-type": "AWS API Call via CloudTrail",
            "source": "aws.iam",
            "time": "2024-05-01T10:15:30Z",
            "region": "us-east-1",
            "detail": {
                "eventSource": "iam.amazonaws.com",
                "eventName": "CreateUser",
                "requestParameters": {"userName": "ec2-user", "path": "/"}
            }
        }"#;
        let event = UserCreatedEvent::from_json(raw).unwrap();
        assert_eq!(event.user_name(), "ec2-user");
        assert_eq!(event.source.as_deref(), Some("aws.iam"));
        assert_eq!(event.detail.event_name.as_deref(), Some("CreateUser"));
        assert!(event.time.is_some());
    }

    #[test]
    fn test_missing_user_name_is_event_error() {
        let err = UserCreatedEvent::from_json(r#"{"detail":{"requestParameters":{}}}"#)
            .unwrap_err();
        assert!(matches!(err, crate::utils::error::NotifyError::EventError(_)));
    }

    #[test]
    fn test_log_line_uses_sentinel() {
        let notification = Notification {
            user_name: "s3-user".to_string(),
            email: None,
            one_time_password: "Xk29Tq...".to_string(),
        };
        assert_eq!(
            notification.log_line(),
            "User Created: s3-user, Email: Email not found, OTP: Xk29Tq..."
        );
    }
}
