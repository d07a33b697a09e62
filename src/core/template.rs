//! Renders a validated [`StackManifest`] as a CloudFormation JSON document.

use crate::config::stack::{logical_id, StackManifest};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde_json::{json, Map, Value};

const SECRET_ID: &str = "OneTimePasswordSecret";
const FUNCTION_ROLE_ID: &str = "NotifierExecutionRole";
const FUNCTION_ID: &str = "NotifierFunction";
const RULE_ID: &str = "UserCreatedRule";
const PERMISSION_ID: &str = "NotifierInvokePermission";

fn policy_id(name: &str) -> String {
    format!("{}Policy", logical_id(name))
}

fn group_id(name: &str) -> String {
    format!("{}Group", logical_id(name))
}

fn user_id(name: &str) -> String {
    format!("{}User", logical_id(name))
}

fn parameter_id(user_name: &str) -> String {
    format!("{}EmailParameter", logical_id(user_name))
}

fn secret_resource(manifest: &StackManifest) -> Value {
    json!({
        "Type": "AWS::SecretsManager::Secret",
        "Properties": {
            "Name": manifest.secret.name,
            "Description": "One-time password for newly created IAM users",
            "GenerateSecretString": {
                "SecretStringTemplate": "{}",
                "GenerateStringKey": "password",
                "PasswordLength": manifest.secret.password_length,
                "ExcludeCharacters": manifest.secret.exclude_characters
            }
        }
    })
}

fn read_only_statement(actions: &[String], resource: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": actions,
            "Resource": resource
        }]
    })
}

fn function_role(manifest: &StackManifest) -> Value {
    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole"
                }]
            },
            "ManagedPolicyArns": [
                "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            ],
            "Policies": [{
                "PolicyName": "NotifierLookups",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        {
                            "Effect": "Allow",
                            "Action": "ssm:GetParameter",
                            "Resource": {
                                "Fn::Sub": format!(
                                    "arn:aws:ssm:${{AWS::Region}}:${{AWS::AccountId}}:parameter{}",
                                    manifest
                                        .function
                                        .email_parameter_template
                                        .replace(crate::utils::validation::USER_NAME_PLACEHOLDER, "*")
                                )
                            }
                        },
                        {
                            "Effect": "Allow",
                            "Action": "secretsmanager:GetSecretValue",
                            "Resource": { "Ref": SECRET_ID }
                        }
                    ]
                }
            }]
        }
    })
}

fn function_resource(manifest: &StackManifest) -> Value {
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "FunctionName": manifest.function.name,
            "Runtime": "provided.al2023",
            "Handler": "bootstrap",
            "Timeout": manifest.function.timeout_seconds,
            "MemorySize": manifest.function.memory_mb,
            "Role": { "Fn::GetAtt": [FUNCTION_ROLE_ID, "Arn"] },
            "Code": {
                "S3Bucket": manifest.function.code_s3_bucket,
                "S3Key": manifest.function.code_s3_key
            },
            "Environment": {
                "Variables": {
                    "SECRET_ID": manifest.secret.name,
                    "EMAIL_PARAMETER_TEMPLATE": manifest.function.email_parameter_template
                }
            }
        }
    })
}

fn outputs(manifest: &StackManifest) -> Value {
    let mut outputs = Map::new();
    outputs.insert(
        "SecretName".to_string(),
        json!({
            "Description": "Secret holding the one-time password",
            "Value": { "Ref": SECRET_ID }
        }),
    );
    for user in &manifest.users {
        outputs.insert(
            format!("{}Email", logical_id(&user.name)),
            json!({
                "Description": format!("Email address of {}", user.name),
                "Value": { "Fn::GetAtt": [parameter_id(&user.name), "Value"] }
            }),
        );
    }
    Value::Object(outputs)
}

/// Validates the manifest, then builds the template.
pub fn render_template(manifest: &StackManifest) -> Result<Value> {
    manifest.validate()?;

    let mut resources = Map::new();
    resources.insert(SECRET_ID.to_string(), secret_resource(manifest));

    for (user, (key, email)) in manifest.users.iter().zip(manifest.email_parameters()) {
        resources.insert(
            parameter_id(&user.name),
            json!({
                "Type": "AWS::SSM::Parameter",
                "Properties": { "Name": key, "Type": "String", "Value": email }
            }),
        );
    }

    for policy in &manifest.policies {
        resources.insert(
            policy_id(&policy.name),
            json!({
                "Type": "AWS::IAM::ManagedPolicy",
                "Properties": {
                    "ManagedPolicyName": policy.name,
                    "PolicyDocument": read_only_statement(&policy.actions, &policy.resource)
                }
            }),
        );
    }

    for group in &manifest.groups {
        let policy_refs: Vec<Value> = group
            .policies
            .iter()
            .map(|p| json!({ "Ref": policy_id(p) }))
            .collect();
        resources.insert(
            group_id(&group.name),
            json!({
                "Type": "AWS::IAM::Group",
                "Properties": { "GroupName": group.name, "ManagedPolicyArns": policy_refs }
            }),
        );
    }

    for user in &manifest.users {
        resources.insert(
            user_id(&user.name),
            json!({
                "Type": "AWS::IAM::User",
                "Properties": {
                    "UserName": user.name,
                    "Groups": [{ "Ref": group_id(&user.group) }],
                    "LoginProfile": {
                        "Password": {
                            "Fn::Sub": format!(
                                "{{{{resolve:secretsmanager:${{{}}}:SecretString:password}}}}",
                                SECRET_ID
                            )
                        },
                        "PasswordResetRequired": user.password_reset_required
                    }
                }
            }),
        );
    }

    resources.insert(FUNCTION_ROLE_ID.to_string(), function_role(manifest));
    resources.insert(FUNCTION_ID.to_string(), function_resource(manifest));
    resources.insert(
        RULE_ID.to_string(),
        json!({
            "Type": "AWS::Events::Rule",
            "Properties": {
                "Name": manifest.rule.name,
                "EventPattern": manifest.event_pattern().to_json(),
                "State": "ENABLED",
                "Targets": [{
                    "Arn": { "Fn::GetAtt": [FUNCTION_ID, "Arn"] },
                    "Id": "NotifierTarget"
                }]
            }
        }),
    );
    resources.insert(
        PERMISSION_ID.to_string(),
        json!({
            "Type": "AWS::Lambda::Permission",
            "Properties": {
                "Action": "lambda:InvokeFunction",
                "FunctionName": { "Ref": FUNCTION_ID },
                "Principal": "events.amazonaws.com",
                "SourceArn": { "Fn::GetAtt": [RULE_ID, "Arn"] }
            }
        }),
    );

    tracing::debug!(resources = resources.len(), "Rendered stack template");

    Ok(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": manifest.stack.description,
        "Resources": Value::Object(resources),
        "Outputs": outputs(manifest)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_profile_resolves_secret() {
        let manifest = StackManifest::from_toml_str(
            r#"
[stack]
name = "t"
[secret]
name = "Otp"
[[groups]]
name = "Readers"
[[users]]
name = "alice"
group = "Readers"
email = "alice@example.com"
[function]
code_s3_bucket = "artifacts-bucket"
code_s3_key = "builds/notifier.zip"
"#,
        )
        .unwrap();

        let template = render_template(&manifest).unwrap();
        let password = &template["Resources"]["AliceUser"]["Properties"]["LoginProfile"]
            ["Password"]["Fn::Sub"];
        assert_eq!(
            password,
            "{{resolve:secretsmanager:${OneTimePasswordSecret}:SecretString:password}}"
        );
        assert_eq!(
            template["Resources"]["AliceUser"]["Properties"]["Groups"][0]["Ref"],
            "ReadersGroup"
        );
        assert_eq!(
            template["Resources"]["NotifierFunction"]["Properties"]["Code"],
            json!({ "S3Bucket": "artifacts-bucket", "S3Key": "builds/notifier.zip" })
        );
    }
}
