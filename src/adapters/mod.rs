// Adapters layer: concrete store implementations behind the domain ports.

pub mod memory;

#[cfg(feature = "lambda")]
pub mod aws;

pub use memory::{InMemoryParameterStore, InMemorySecretStore};
