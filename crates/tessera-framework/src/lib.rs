//! # Tessera Framework
//!
//! Slash commands and their interactive components.
//!
//! This layer provides:
//! - A registration DSL for commands, their options, checks and components
//!   ([`command`])
//! - The component identity protocol that survives the round trip through
//!   the platform's opaque `custom_id` ([`component_id`])
//! - An immutable command registry ([`registry`])
//! - Request contexts and Axum-style handlers with parameter extraction
//!   ([`context`], [`handler`], [`extractor`])
//! - The dispatch pipeline from raw platform event to handler ([`dispatcher`])
//!
//! Transports and the event loop live elsewhere; everything here is
//! independent of how events arrive.

pub mod command;
pub mod component_id;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod messages;
pub mod registry;

pub use command::{
    CommandDefinition, CommandManifest, ChecksScope, ComponentTemplate, ComponentsScope,
    FromOptionValue, OptionType, OptionValue, OptionsScope, ResolvedOptions, SlashCommand,
};
pub use component_id::{ComponentIdBuilder, ComponentIdCodec, ComponentIdentity, DEFAULT_MAX_LENGTH};
pub use context::{ComponentContext, InteractionContext, InvocationContext};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{
    AuthorizationError, CheckFailure, ConfigurationError, DecodeError, ExtractError, ExtractResult,
    NotFound, ValidationError,
};
pub use extractor::{FromContext, Identity, Invoker, Options, SelectedValues};
pub use handler::{BoxedHandler, Handler, HandlerResponse, into_handler};
pub use messages::DispatchMessages;
pub use registry::CommandRegistry;
