//! Runtime error types.

use thiserror::Error;

use tessera_framework::ConfigurationError;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can stop the runtime from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command could not be registered.
    #[error("Command registration failed: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
