use crate::core::notifier::{email_parameter_key, DEFAULT_EMAIL_KEY_TEMPLATE};
use crate::core::rule::{EventPattern, CREATE_USER};
use crate::utils::error::{NotifyError, Result};
use crate::utils::validation::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Declarative description of the onboarding stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackManifest {
    pub stack: StackInfo,
    pub secret: SecretConfig,
    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub rule: RuleConfig,
    #[serde(default)]
    pub function: FunctionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretConfig {
    pub name: String,
    #[serde(default = "default_password_length")]
    pub password_length: u32,
    #[serde(default = "default_exclude_characters")]
    pub exclude_characters: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub name: String,
    pub actions: Vec<String>,
    #[serde(default = "default_resource")]
    pub resource: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub policies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub group: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub password_reset_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_rule_name")]
    pub name: String,
    #[serde(default = "default_event_names")]
    pub event_names: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            name: default_rule_name(),
            event_names: default_event_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    #[serde(default = "default_function_name")]
    pub name: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_memory")]
    pub memory_mb: u32,
    #[serde(default = "default_email_template")]
    pub email_parameter_template: String,
    /// Bucket holding the packaged `bootstrap` zip.
    #[serde(default)]
    pub code_s3_bucket: Option<String>,
    #[serde(default = "default_code_key")]
    pub code_s3_key: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: default_function_name(),
            timeout_seconds: default_timeout(),
            memory_mb: default_memory(),
            email_parameter_template: default_email_template(),
            code_s3_bucket: None,
            code_s3_key: default_code_key(),
        }
    }
}

fn default_password_length() -> u32 {
    16
}

fn default_exclude_characters() -> String {
    "\"@/\\".to_string()
}

fn default_resource() -> String {
    "*".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rule_name() -> String {
    "UserCreatedRule".to_string()
}

fn default_event_names() -> Vec<String> {
    vec![CREATE_USER.to_string()]
}

fn default_function_name() -> String {
    "UserCreatedNotifier".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_memory() -> u32 {
    128
}

fn default_email_template() -> String {
    DEFAULT_EMAIL_KEY_TEMPLATE.to_string()
}

fn default_code_key() -> String {
    "iam-onboard/lambda.zip".to_string()
}

/// Operator-facing output of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
    pub description: String,
}

/// `s3-user` -> `S3User`, used for logical ids and output keys.
pub fn logical_id(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

impl StackManifest {
    /// 從 TOML 檔案載入清單
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| NotifyError::ConfigError {
            message: format!("Failed to read stack manifest {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let manifest: StackManifest = toml::from_str(content)?;
        tracing::debug!(
            stack = %manifest.stack.name,
            users = manifest.users.len(),
            "Loaded stack manifest"
        );
        Ok(manifest)
    }

    pub fn event_pattern(&self) -> EventPattern {
        EventPattern::for_iam_actions(self.rule.event_names.iter().cloned())
    }

    /// One `(key, email)` pair per declared user.
    pub fn email_parameters(&self) -> Vec<(String, String)> {
        self.users
            .iter()
            .map(|user| {
                (
                    email_parameter_key(&self.function.email_parameter_template, &user.name),
                    user.email.clone(),
                )
            })
            .collect()
    }

    pub fn outputs(&self) -> Vec<StackOutput> {
        let mut outputs = vec![StackOutput {
            key: "SecretName".to_string(),
            value: self.secret.name.clone(),
            description: "Secret holding the one-time password".to_string(),
        }];

        for (user, (key, email)) in self.users.iter().zip(self.email_parameters()) {
            outputs.push(StackOutput {
                key: format!("{}Email", logical_id(&user.name)),
                value: email,
                description: format!("Email stored at {}", key),
            });
        }

        outputs
    }

    fn check_references(&self) -> Result<()> {
        let policies: HashSet<&str> = self.policies.iter().map(|p| p.name.as_str()).collect();
        let groups: HashSet<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();

        for group in &self.groups {
            for policy in &group.policies {
                if !policies.contains(policy.as_str()) {
                    return Err(NotifyError::UnresolvedReference {
                        kind: "Policy".to_string(),
                        name: policy.clone(),
                        referenced_by: group.name.clone(),
                    });
                }
            }
        }

        for user in &self.users {
            if !groups.contains(user.group.as_str()) {
                return Err(NotifyError::UnresolvedReference {
                    kind: "Group".to_string(),
                    name: user.group.clone(),
                    referenced_by: user.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn check_logical_ids(&self) -> Result<()> {
        // 不同名稱可能轉成相同的 logical id (s3-user / s3_user)
        let kinds: [Vec<&String>; 3] = [
            self.policies.iter().map(|p| &p.name).collect(),
            self.groups.iter().map(|g| &g.name).collect(),
            self.users.iter().map(|u| &u.name).collect(),
        ];
        for names in kinds {
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(logical_id(name)) {
                    return Err(NotifyError::ValidationError {
                        message: format!(
                            "'{}' collides with another resource's logical id",
                            name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Validate for StackManifest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("stack.name", &self.stack.name)?;

        validate_non_empty_string("secret.name", &self.secret.name)?;
        validate_range("secret.password_length", self.secret.password_length, 8, 128)?;

        for policy in &self.policies {
            validate_iam_name("policies.name", &policy.name)?;
            if policy.actions.is_empty() {
                return Err(NotifyError::InvalidConfigValueError {
                    field: "policies.actions".to_string(),
                    value: policy.name.clone(),
                    reason: "Policy must grant at least one action".to_string(),
                });
            }
            for action in &policy.actions {
                validate_read_only_action("policies.actions", action)?;
            }
        }

        for group in &self.groups {
            validate_iam_name("groups.name", &group.name)?;
        }

        for user in &self.users {
            validate_iam_name("users.name", &user.name)?;
            validate_email("users.email", &user.email)?;
        }

        validate_unique("policies.name", self.policies.iter().map(|p| p.name.as_str()))?;
        validate_unique("groups.name", self.groups.iter().map(|g| g.name.as_str()))?;
        validate_unique("users.name", self.users.iter().map(|u| u.name.as_str()))?;
        self.check_logical_ids()?;
        self.check_references()?;

        if self.rule.event_names.is_empty() {
            return Err(NotifyError::InvalidConfigValueError {
                field: "rule.event_names".to_string(),
                value: String::new(),
                reason: "Rule must match at least one action".to_string(),
            });
        }

        validate_iam_name("function.name", &self.function.name)?;
        validate_range("function.timeout_seconds", self.function.timeout_seconds, 1, 900)?;
        validate_range("function.memory_mb", self.function.memory_mb, 128, 10240)?;
        validate_key_template(
            "function.email_parameter_template",
            &self.function.email_parameter_template,
        )?;
        let bucket =
            validate_required_field("function.code_s3_bucket", &self.function.code_s3_bucket)?;
        validate_s3_bucket_name("function.code_s3_bucket", bucket)?;
        validate_non_empty_string("function.code_s3_key", &self.function.code_s3_key)?;

        tracing::info!(stack = %self.stack.name, "✅ Stack manifest validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[stack]
name = "onboarding"

[secret]
name = "OneTimePassword"

[[policies]]
name = "S3ReadOnly"
actions = ["s3:Get*", "s3:List*"]

[[groups]]
name = "S3Group"
policies = ["S3ReadOnly"]

[[users]]
name = "s3-user"
group = "S3Group"
email = "s3-user@example.com"

[function]
code_s3_bucket = "onboarding-artifacts"
"#;

    #[test]
    fn test_defaults_applied() {
        let manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        assert_eq!(manifest.secret.password_length, 16);
        assert_eq!(manifest.rule.event_names, vec!["CreateUser".to_string()]);
        assert_eq!(manifest.function.timeout_seconds, 10);
        assert!(manifest.users[0].password_reset_required);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_logical_id() {
        assert_eq!(logical_id("s3-user"), "S3User");
        assert_eq!(logical_id("ec2_user"), "Ec2User");
        assert_eq!(logical_id("S3ReadOnly"), "S3ReadOnly");
    }

    #[test]
    fn test_email_parameters() {
        let manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        assert_eq!(
            manifest.email_parameters(),
            vec![(
                "/user/s3-user/email".to_string(),
                "s3-user@example.com".to_string()
            )]
        );
    }

    #[test]
    fn test_unknown_policy_reference() {
        let mut manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        manifest.groups[0].policies.push("Missing".to_string());
        let err = manifest.validate().unwrap_err();
        assert!(matches!(
            err,
            NotifyError::UnresolvedReference { ref kind, ref name, .. }
                if kind == "Policy" && name == "Missing"
        ));
    }

    #[test]
    fn test_logical_id_collision() {
        let mut manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        let mut twin = manifest.users[0].clone();
        twin.name = "s3_user".to_string();
        manifest.users.push(twin);
        assert!(matches!(
            manifest.validate(),
            Err(NotifyError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_write_action_rejected() {
        let mut manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        manifest.policies[0].actions.push("s3:*".to_string());
        let err = manifest.validate().unwrap_err();
        assert!(matches!(
            err,
            NotifyError::InvalidConfigValueError { ref value, .. } if value == "s3:*"
        ));
    }

    #[test]
    fn test_code_bucket_required() {
        let mut manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        manifest.function.code_s3_bucket = None;
        assert!(matches!(
            manifest.validate(),
            Err(NotifyError::MissingConfigError { ref field }) if field == "function.code_s3_bucket"
        ));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let mut manifest = StackManifest::from_toml_str(MINIMAL).unwrap();
        manifest.rule.event_names.clear();
        assert!(manifest.validate().is_err());
    }
}
