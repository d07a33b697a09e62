use crate::adapters::{InMemoryParameterStore, InMemorySecretStore};
use crate::config::stack::StackManifest;
use crate::core::notifier::{Notifier, NotifierSettings};
use crate::core::{Notification, UserCreatedEvent};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// The rule pattern rejected the event; the notifier was not run.
    Skipped { event_name: Option<String> },
    Delivered(Notification),
}

/// Builds a notifier over in-memory stores seeded with the manifest's email
/// parameters and a secret holding `password`.
pub fn local_notifier(
    manifest: &StackManifest,
    password: &str,
) -> Notifier<InMemoryParameterStore, InMemorySecretStore> {
    let parameters = InMemoryParameterStore::with_parameters(manifest.email_parameters());
    let secrets = InMemorySecretStore::with_password(manifest.secret.name.clone(), password);
    let settings = NotifierSettings::new(manifest.secret.name.clone())
        .with_email_key_template(manifest.function.email_parameter_template.clone());
    Notifier::new(parameters, secrets, settings)
}

/// Routes `event` through the manifest's rule and, when it matches, the notifier.
pub async fn simulate(
    manifest: &StackManifest,
    event: &UserCreatedEvent,
    password: &str,
) -> Result<SimulationOutcome> {
    manifest.validate()?;

    let pattern = manifest.event_pattern();
    if !pattern.matches(event) {
        tracing::info!(
            event_name = ?event.detail.event_name,
            "Event does not match rule '{}', skipping",
            manifest.rule.name
        );
        return Ok(SimulationOutcome::Skipped {
            event_name: event.detail.event_name.clone(),
        });
    }

    let notifier = local_notifier(manifest, password);
    let notification = notifier.notify(event).await?;
    Ok(SimulationOutcome::Delivered(notification))
}
