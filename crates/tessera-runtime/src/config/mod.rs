//! Configuration module for the Tessera runtime.
//!
//! Layered TOML/YAML/environment configuration for logging, component
//! identity, dispatch and user-visible messages.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ComponentsConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SpanEventConfig, TesseraConfig,
};
pub use validation::validate_config;
