//! # Tessera
//!
//! Slash commands and stateless interactive components for bots.
//!
//! ## Overview
//!
//! A command declares its options, checks and component templates once, at
//! startup. Components carry their whole state in the platform's opaque
//! `custom_id`, so a click can be routed back to its command, action and
//! original invoker without any server-side session storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ PlatformEvent ┌──────────────┐     ┌────────────┐     ┌─────────┐
//! │ Transport │──────────────▶│ SlashRuntime │────▶│ Dispatcher │────▶│ Handler │
//! └───────────┘               │ (task/event) │     │            │     └─────────┘
//!                             └──────────────┘     └────────────┘          │
//!                                                        │  Reply         │
//!                                                        ▼                ▼
//!                                                  ┌───────────────────────────┐
//!                                                  │         Responder         │
//!                                                  └───────────────────────────┘
//! ```
//!
//! - **Runtime**: loads configuration, initializes logging and runs one task per event
//! - **Dispatcher**: resolves, validates, authorizes and checks before invoking
//! - **Handlers**: plain async functions (Axum-style)
//! - **Responder**: implemented by the transport to deliver replies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! fn say() -> SlashCommand {
//!     SlashCommand::new("say", "Make the bot say something")
//!         .options(|o| {
//!             o.required_string("content", "What to say");
//!         })
//!         .components(|c| {
//!             c.danger("delete", "Delete")
//!                 .restrict_to_invoker()
//!                 .on_click(|ctx: Arc<ComponentContext>| async move {
//!                     let _ = ctx.delete_message().await;
//!                 });
//!         })
//!         .handler(|ctx: Arc<InvocationContext>| async move {
//!             let content: String = ctx.require("content")?;
//!             Ok::<_, ExtractError>(Reply::text(content).rows(ctx.components()))
//!         })
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SlashRuntime::builder().command(say()).build(responder)?;
//!     runtime.run(events).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `tessera.toml` (default)
//! - `yaml-config`: load `tessera.yaml`
//! - `json-log`: JSON log output

pub use tessera_core as core;
pub use tessera_framework as framework;
pub use tessera_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use tessera_runtime::{SlashRuntime, TesseraConfig};

    // Command definition
    pub use tessera_framework::{ComponentIdentity, SlashCommand};

    // Contexts and extractors
    pub use tessera_framework::{
        ComponentContext, Identity, InteractionContext, InvocationContext, Invoker, Options,
        SelectedValues,
    };

    // Errors handlers commonly return
    pub use tessera_framework::{ExtractError, ExtractResult};

    // Platform types
    pub use tessera_core::{
        ActionRow, BoxedResponder, ButtonStyle, Embed, Permission, PlatformEvent, Reply,
        Responder, User, UserId,
    };

    // Logging macros
    pub use tessera_runtime::prelude::*;
}
