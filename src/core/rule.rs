use crate::core::UserCreatedEvent;
use serde_json::{json, Value};

pub const IAM_SOURCE: &str = "aws.iam";
pub const CLOUDTRAIL_DETAIL_TYPE: &str = "AWS API Call via CloudTrail";
pub const IAM_EVENT_SOURCE: &str = "iam.amazonaws.com";
pub const CREATE_USER: &str = "CreateUser";

/// Subset of the EventBridge pattern language: each field is an
/// "any of" list, and an empty list matches anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPattern {
    pub source: Vec<String>,
    pub detail_type: Vec<String>,
    pub event_source: Vec<String>,
    pub event_names: Vec<String>,
}

impl Default for EventPattern {
    fn default() -> Self {
        Self::for_iam_actions([CREATE_USER])
    }
}

fn field_matches(allowed: &[String], actual: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match actual {
        Some(value) => allowed.iter().any(|a| a == value),
        None => false,
    }
}

impl EventPattern {
    pub fn for_iam_actions<I, T>(actions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            source: vec![IAM_SOURCE.to_string()],
            detail_type: vec![CLOUDTRAIL_DETAIL_TYPE.to_string()],
            event_source: vec![IAM_EVENT_SOURCE.to_string()],
            event_names: actions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, event: &UserCreatedEvent) -> bool {
        field_matches(&self.source, event.source.as_deref())
            && field_matches(&self.detail_type, event.detail_type.as_deref())
            && field_matches(&self.event_source, event.detail.event_source.as_deref())
            && field_matches(&self.event_names, event.detail.event_name.as_deref())
    }

    /// Renders the pattern in the EventBridge JSON form.
    pub fn to_json(&self) -> Value {
        let mut pattern = serde_json::Map::new();
        if !self.source.is_empty() {
            pattern.insert("source".to_string(), json!(self.source));
        }
        if !self.detail_type.is_empty() {
            pattern.insert("detail-type".to_string(), json!(self.detail_type));
        }

        let mut detail = serde_json::Map::new();
        if !self.event_source.is_empty() {
            detail.insert("eventSource".to_string(), json!(self.event_source));
        }
        if !self.event_names.is_empty() {
            detail.insert("eventName".to_string(), json!(self.event_names));
        }
        if !detail.is_empty() {
            pattern.insert("detail".to_string(), Value::Object(detail));
        }

        Value::Object(pattern)
    }
}
