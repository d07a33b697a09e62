pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use adapters::{InMemoryParameterStore, InMemorySecretStore};
pub use config::StackManifest;
pub use core::notifier::{Notifier, NotifierSettings};
pub use core::{Notification, UserCreatedEvent, EMAIL_NOT_FOUND};
pub use utils::error::{NotifyError, Result};
