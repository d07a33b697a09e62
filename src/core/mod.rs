pub mod notifier;
pub mod rule;
pub mod template;

pub use crate::domain::model::{Notification, UserCreatedEvent, EMAIL_NOT_FOUND};
pub use crate::domain::ports::{ParameterStore, SecretStore};
pub use crate::utils::error::Result;
