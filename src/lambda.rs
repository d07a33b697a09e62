use iam_onboard::adapters::aws::{load_sdk_config, SecretsManagerStore, SsmParameterStore};
use iam_onboard::utils::{logger, validation::Validate};
use iam_onboard::{LambdaConfig, Notifier, UserCreatedEvent};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;

type AwsNotifier = Notifier<SsmParameterStore, SecretsManagerStore>;

#[derive(Serialize)]
pub struct Response {
    pub user_name: String,
    pub email_found: bool,
}

async fn function_handler(
    notifier: &AwsNotifier,
    event: LambdaEvent<Value>,
) -> Result<Response, Error> {
    tracing::debug!(request_id = %event.context.request_id, "Received user creation event");

    let user_event = UserCreatedEvent::from_value(event.payload)?;
    let notification = notifier.notify(&user_event).await?;

    Ok(Response {
        user_name: notification.user_name,
        email_found: notification.email.is_some(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    // SDK client 只建立一次，供每次 invocation 共用
    let sdk_config = load_sdk_config(&config.region).await;
    let notifier = Notifier::new(
        SsmParameterStore::from_sdk_config(&sdk_config),
        SecretsManagerStore::from_sdk_config(&sdk_config),
        config.notifier_settings(),
    );
    let notifier = &notifier;

    tracing::info!(secret_id = %config.secret_id, "Starting user notification function");
    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(notifier, event).await
    }))
    .await
}
