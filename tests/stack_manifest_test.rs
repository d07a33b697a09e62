use anyhow::Result;
use iam_onboard::core::template::render_template;
use iam_onboard::utils::validation::Validate;
use iam_onboard::{NotifyError, StackManifest};
use std::path::Path;
use tempfile::TempDir;

fn bundled_manifest() -> Result<StackManifest> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("deploy/stack.toml");
    Ok(StackManifest::from_file(path)?)
}

#[test]
fn test_bundled_manifest_is_valid() -> Result<()> {
    let manifest = bundled_manifest()?;
    manifest.validate()?;
    assert_eq!(manifest.users.len(), 2);
    assert_eq!(
        manifest.email_parameters(),
        vec![
            (
                "/user/s3-user/email".to_string(),
                "s3-user@example.com".to_string()
            ),
            (
                "/user/ec2-user/email".to_string(),
                "ec2-user@example.com".to_string()
            ),
        ]
    );
    Ok(())
}

#[test]
fn test_outputs_list_secret_and_emails() -> Result<()> {
    let outputs = bundled_manifest()?.outputs();
    let pairs: Vec<(&str, &str)> = outputs
        .iter()
        .map(|o| (o.key.as_str(), o.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("SecretName", "OneTimePassword"),
            ("S3UserEmail", "s3-user@example.com"),
            ("Ec2UserEmail", "ec2-user@example.com"),
        ]
    );
    Ok(())
}

#[test]
fn test_rendered_template_wires_resources() -> Result<()> {
    let template = render_template(&bundled_manifest()?)?;
    let resources = &template["Resources"];

    assert_eq!(
        resources["OneTimePasswordSecret"]["Properties"]["GenerateSecretString"]
            ["GenerateStringKey"],
        "password"
    );
    assert_eq!(
        resources["S3UserEmailParameter"]["Properties"]["Name"],
        "/user/s3-user/email"
    );
    assert_eq!(
        resources["S3UserGroupGroup"]["Properties"]["ManagedPolicyArns"][0]["Ref"],
        "S3ReadOnlyPolicyPolicy"
    );
    assert_eq!(
        resources["S3ReadOnlyPolicyPolicy"]["Properties"]["PolicyDocument"]["Statement"][0]
            ["Action"][1],
        "s3:List*"
    );
    assert_eq!(
        resources["Ec2UserUser"]["Properties"]["Groups"][0]["Ref"],
        "EC2UserGroupGroup"
    );
    assert_eq!(
        resources["UserCreatedRule"]["Properties"]["EventPattern"]["detail"]["eventName"][0],
        "CreateUser"
    );
    assert_eq!(resources["NotifierFunction"]["Properties"]["Timeout"], 10);
    assert_eq!(
        resources["NotifierFunction"]["Properties"]["Code"]["S3Bucket"],
        "iam-onboarding-artifacts"
    );
    assert_eq!(
        resources["NotifierFunction"]["Properties"]["Code"]["S3Key"],
        "iam-onboard/lambda.zip"
    );
    assert_eq!(
        resources["NotifierFunction"]["Properties"]["Environment"]["Variables"]["SECRET_ID"],
        "OneTimePassword"
    );
    assert_eq!(
        template["Outputs"]["S3UserEmail"]["Value"]["Fn::GetAtt"][0],
        "S3UserEmailParameter"
    );
    Ok(())
}

#[test]
fn test_unresolved_group_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[stack]
name = "broken"

[secret]
name = "Otp"

[[users]]
name = "orphan"
group = "NoSuchGroup"
email = "orphan@example.com"
"#,
    )?;

    let manifest = StackManifest::from_file(&path)?;
    let err = manifest.validate().unwrap_err();
    assert!(matches!(
        err,
        NotifyError::UnresolvedReference { ref kind, ref name, ref referenced_by }
            if kind == "Group" && name == "NoSuchGroup" && referenced_by == "orphan"
    ));
    assert!(render_template(&manifest).is_err());
    Ok(())
}

#[test]
fn test_invalid_toml_reports_toml_error() {
    let result = StackManifest::from_toml_str("[stack\nname = ");
    assert!(matches!(result, Err(NotifyError::TomlError(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let result = StackManifest::from_file("/definitely/not/here.toml");
    assert!(matches!(result, Err(NotifyError::ConfigError { .. })));
}

#[test]
fn test_out_of_range_timeout_rejected() -> Result<()> {
    let mut manifest = bundled_manifest()?;
    manifest.function.timeout_seconds = 0;
    assert!(manifest.validate().is_err());
    manifest.function.timeout_seconds = 901;
    assert!(manifest.validate().is_err());
    Ok(())
}

#[test]
fn test_missing_code_bucket_blocks_render() -> Result<()> {
    let mut manifest = bundled_manifest()?;
    manifest.function.code_s3_bucket = None;
    assert!(matches!(
        render_template(&manifest),
        Err(NotifyError::MissingConfigError { ref field }) if field == "function.code_s3_bucket"
    ));
    Ok(())
}

#[test]
fn test_wildcard_policy_action_blocks_render() -> Result<()> {
    let mut manifest = bundled_manifest()?;
    manifest.policies[0].actions = vec!["s3:*".to_string()];
    assert!(render_template(&manifest).is_err());
    Ok(())
}
