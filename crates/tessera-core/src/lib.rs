//! # Tessera Core
//!
//! Platform boundary types for the Tessera slash-command framework.
//!
//! This crate describes what crosses the line between the framework and the
//! messaging platform, and nothing else:
//!
//! - **Model**: snowflake ids, users, guild members and permissions ([`model`])
//! - **Inbound events**: slash invocations and component interactions ([`event`])
//! - **Outbound payloads**: replies, embeds, buttons and select menus ([`reply`])
//! - **Responder**: the async trait a transport implements to deliver replies ([`responder`])
//!
//! ```text
//! ┌───────────┐  PlatformEvent  ┌────────────┐   Reply    ┌───────────┐
//! │ Transport │────────────────▶│ Dispatcher │──────────▶│ Responder │
//! └───────────┘                 └────────────┘            └───────────┘
//! ```
//!
//! Connection handling, gateways and rate limiting belong to the transport
//! and are not modelled here.

pub mod error;
pub mod event;
pub mod model;
pub mod reply;
pub mod responder;

pub use error::{ReplyError, ReplyResult};
pub use event::{ComponentEvent, ComponentKind, PlatformEvent, RawOption, SlashEvent};
pub use model::{ChannelId, GuildId, Member, MessageId, Permission, RoleId, User, UserId};
pub use reply::{
    ActionRow, Button, ButtonStyle, Component, Embed, EmbedField, Reply, SelectMenu, SelectOption,
};
pub use responder::{BoxedResponder, MemoryResponder, Responder, ResponderCall};
