//! Tessera Runtime - configuration, logging and the event loop.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `TesseraConfig`)
//! - Logging initialization from configuration (`LoggingBuilder`)
//! - The concurrent dispatch loop (`SlashRuntime`)
//!
//! ```ignore
//! use tessera_runtime::SlashRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SlashRuntime::builder()
//!         .command(say_command())
//!         .build(Arc::new(MyResponder::connect().await?))?;
//!
//!     // Run until Ctrl+C
//!     runtime.run(events).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, TesseraConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, SlashRuntime};

pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
