#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod stack;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use stack::StackManifest;
