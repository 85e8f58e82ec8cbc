//! Request-scoped contexts handed to handlers and checks.
//!
//! - [`InvocationContext`]: one slash-command invocation. Carries the raw
//!   event, the resolved command and the validated options.
//! - [`ComponentContext`]: one component interaction. Carries the raw
//!   event, the owning command and the decoded identity.
//!
//! Both implement [`InteractionContext`], the object-safe view that checks
//! are written against, so one check serves both paths. A context lives in
//! an `Arc` for the duration of one dispatch and is dropped afterwards.

use std::sync::Arc;

use async_trait::async_trait;

use tessera_core::{
    ActionRow, BoxedResponder, ChannelId, ComponentEvent, GuildId, Member, Reply, ReplyResult,
    SlashEvent, User, UserId,
};

use crate::command::options::{FromOptionValue, ResolvedOptions};
use crate::command::{CommandDefinition, render_rows};
use crate::component_id::{ComponentIdBuilder, ComponentIdCodec, ComponentIdentity};
use crate::error::{ExtractError, ExtractResult};

/// Collaborators shared by every context of one dispatcher.
#[derive(Clone)]
pub(crate) struct ContextEnv {
    pub(crate) responder: BoxedResponder,
    pub(crate) owners: Arc<[UserId]>,
    pub(crate) codec: ComponentIdCodec,
}

/// What every interaction context exposes.
#[async_trait]
pub trait InteractionContext: Send + Sync {
    fn interaction_id(&self) -> &str;

    /// The user who triggered the interaction.
    fn user(&self) -> &User;

    /// Guild member data; `None` in direct messages.
    fn member(&self) -> Option<&Member>;

    fn guild_id(&self) -> Option<GuildId>;

    fn channel_id(&self) -> Option<ChannelId>;

    /// Name of the command the interaction belongs to.
    fn command_name(&self) -> &str;

    /// Configured application owners.
    fn application_owners(&self) -> &[UserId];

    fn is_dm(&self) -> bool {
        self.guild_id().is_none()
    }

    fn is_application_owner(&self) -> bool {
        self.application_owners().contains(&self.user().id)
    }

    /// Replies to the interaction.
    async fn reply(&self, reply: Reply) -> ReplyResult<()>;
}

/// Context of one slash-command invocation.
pub struct InvocationContext {
    event: SlashEvent,
    command: Arc<CommandDefinition>,
    options: ResolvedOptions,
    env: ContextEnv,
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("command", &self.command.name())
            .field("interaction_id", &self.event.interaction_id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl InvocationContext {
    pub(crate) fn new(
        event: SlashEvent,
        command: Arc<CommandDefinition>,
        options: ResolvedOptions,
        env: ContextEnv,
    ) -> Self {
        Self {
            event,
            command,
            options,
            env,
        }
    }

    pub fn event(&self) -> &SlashEvent {
        &self.event
    }

    pub fn command(&self) -> &Arc<CommandDefinition> {
        &self.command
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Reads an option; `None` if absent.
    ///
    /// Options are validated before the handler runs, so reading a declared
    /// option with its declared type cannot fail.
    pub fn option<T: FromOptionValue>(&self, name: &str) -> Option<T> {
        self.options.get_as(name).ok().flatten()
    }

    /// Reads an option that must be present.
    pub fn require<T: FromOptionValue>(&self, name: &str) -> ExtractResult<T> {
        self.options
            .get_as(name)?
            .ok_or_else(|| ExtractError::OptionMissing(name.to_string()))
    }

    /// Reads an option, falling back to `default`.
    pub fn option_or<T: FromOptionValue>(&self, name: &str, default: T) -> T {
        self.option(name).unwrap_or(default)
    }

    pub async fn reply(&self, reply: impl Into<Reply> + Send) -> ReplyResult<()> {
        self.env
            .responder
            .reply(&self.event.interaction_id, reply.into())
            .await
    }

    /// Acknowledges now and answers later.
    pub async fn defer(&self, ephemeral: bool) -> ReplyResult<()> {
        self.env
            .responder
            .defer(&self.event.interaction_id, ephemeral)
            .await
    }

    /// The command's component templates, rendered for the invoker.
    pub fn components(&self) -> Vec<ActionRow> {
        render_rows(
            self.command.components().templates(),
            self.command.name(),
            self.event.user.id,
        )
    }

    /// Starts a run-time identity owned by this command.
    pub fn component_id(&self, action: impl Into<String>) -> ComponentIdBuilder {
        self.env.codec.builder(self.command.name()).action(action)
    }
}

#[async_trait]
impl InteractionContext for InvocationContext {
    fn interaction_id(&self) -> &str {
        &self.event.interaction_id
    }

    fn user(&self) -> &User {
        &self.event.user
    }

    fn member(&self) -> Option<&Member> {
        self.event.member.as_ref()
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.event.guild_id
    }

    fn channel_id(&self) -> Option<ChannelId> {
        self.event.channel_id
    }

    fn command_name(&self) -> &str {
        self.command.name()
    }

    fn application_owners(&self) -> &[UserId] {
        &self.env.owners
    }

    async fn reply(&self, reply: Reply) -> ReplyResult<()> {
        InvocationContext::reply(self, reply).await
    }
}

/// Context of one component interaction.
pub struct ComponentContext {
    event: ComponentEvent,
    command: Arc<CommandDefinition>,
    identity: ComponentIdentity,
    env: ContextEnv,
}

impl std::fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentContext")
            .field("command", &self.command.name())
            .field("interaction_id", &self.event.interaction_id)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl ComponentContext {
    pub(crate) fn new(
        event: ComponentEvent,
        command: Arc<CommandDefinition>,
        identity: ComponentIdentity,
        env: ContextEnv,
    ) -> Self {
        Self {
            event,
            command,
            identity,
            env,
        }
    }

    pub fn event(&self) -> &ComponentEvent {
        &self.event
    }

    pub fn command(&self) -> &Arc<CommandDefinition> {
        &self.command
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    pub fn action(&self) -> &str {
        self.identity.action()
    }

    /// Reads one payload entry of the identity.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.identity.get(key)
    }

    /// Values chosen in a select menu; empty for buttons.
    pub fn selected_values(&self) -> &[String] {
        self.event.selected_values()
    }

    pub async fn reply(&self, reply: impl Into<Reply> + Send) -> ReplyResult<()> {
        self.env
            .responder
            .reply(&self.event.interaction_id, reply.into())
            .await
    }

    pub async fn defer(&self, ephemeral: bool) -> ReplyResult<()> {
        self.env
            .responder
            .defer(&self.event.interaction_id, ephemeral)
            .await
    }

    /// Replaces the message carrying the component.
    pub async fn edit_message(&self, reply: impl Into<Reply> + Send) -> ReplyResult<()> {
        self.env
            .responder
            .edit_message(&self.event.interaction_id, reply.into())
            .await
    }

    /// Deletes the message carrying the component.
    pub async fn delete_message(&self) -> ReplyResult<()> {
        self.env
            .responder
            .delete_message(&self.event.interaction_id)
            .await
    }

    /// The command's component templates, rendered for the clicking user.
    pub fn components(&self) -> Vec<ActionRow> {
        render_rows(
            self.command.components().templates(),
            self.command.name(),
            self.event.user.id,
        )
    }

    pub fn component_id(&self, action: impl Into<String>) -> ComponentIdBuilder {
        self.env.codec.builder(self.command.name()).action(action)
    }
}

#[async_trait]
impl InteractionContext for ComponentContext {
    fn interaction_id(&self) -> &str {
        &self.event.interaction_id
    }

    fn user(&self) -> &User {
        &self.event.user
    }

    fn member(&self) -> Option<&Member> {
        self.event.member.as_ref()
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.event.guild_id
    }

    fn channel_id(&self) -> Option<ChannelId> {
        self.event.channel_id
    }

    fn command_name(&self) -> &str {
        self.command.name()
    }

    fn application_owners(&self) -> &[UserId] {
        &self.env.owners
    }

    async fn reply(&self, reply: Reply) -> ReplyResult<()> {
        ComponentContext::reply(self, reply).await
    }
}
