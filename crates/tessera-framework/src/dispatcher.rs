//! Event dispatcher for the Tessera framework.
//!
//! The [`Dispatcher`] turns one [`PlatformEvent`] into at most one handler
//! invocation.
//!
//! Slash path:
//!
//! 1. Resolve the command by name (guild-scoped commands only in their guild)
//! 2. Validate the supplied options against the schema
//! 3. Run the command's checks in order
//! 4. Invoke the slash handler, unless its parameters cannot be extracted
//!
//! Component path:
//!
//! 1. Decode the opaque identifier
//! 2. Resolve the owning command; a missing command counts as a decode
//!    failure
//! 3. Authorize the clicking user against a restricted identity
//! 4. Run the command's checks in order
//! 5. Invoke the handler bound to the action, else the fallback, unless its
//!    parameters cannot be extracted
//!
//! Every early exit is answered through the responder and reported as a
//! [`DispatchOutcome`]. Nothing here is fatal.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(Arc::new(registry), responder)
//!     .with_owners([UserId(1)])
//!     .with_messages(DispatchMessages::default());
//!
//! let outcome = dispatcher.dispatch(event).await;
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, Level, debug, error, span, warn};

use tessera_core::{BoxedResponder, ComponentEvent, PlatformEvent, Reply, SlashEvent, UserId};

use crate::command::options;
use crate::command::run_checks;
use crate::context::{ComponentContext, ContextEnv, InvocationContext};
use crate::error::{AuthorizationError, CheckFailure, DecodeError, ExtractError, ValidationError};
use crate::messages::DispatchMessages;
use crate::registry::CommandRegistry;

/// How one dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The slash handler ran.
    Invoked { command: String },
    /// A component handler ran.
    Handled { command: String, action: String },
    /// The slash command is not registered (or not in this guild).
    UnknownCommand { command: String },
    /// An option failed validation.
    InvalidOptions(ValidationError),
    /// A check rejected the interaction.
    CheckFailed(CheckFailure),
    /// The component identifier could not be used.
    InvalidComponent(DecodeError),
    /// A restricted component was used by someone else.
    Unauthorized(AuthorizationError),
    /// No handler is bound to the action and there is no fallback.
    UnboundAction { command: String, action: String },
    /// A handler parameter could not be extracted, so the handler did not run.
    HandlerSkipped(ExtractError),
}

impl DispatchOutcome {
    /// Returns `true` if a handler ran.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Invoked { .. } | Self::Handled { .. })
    }
}

/// Routes platform events to command handlers.
///
/// Cheap to clone; every clone shares the same frozen registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    env: ContextEnv,
    messages: Arc<DispatchMessages>,
    notify_invalid_components: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.registry.len())
            .field("owners", &self.env.owners)
            .field("notify_invalid_components", &self.notify_invalid_components)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, responder: BoxedResponder) -> Self {
        let codec = registry.codec();
        Self {
            registry,
            env: ContextEnv {
                responder,
                owners: Arc::from(Vec::new()),
                codec,
            },
            messages: Arc::new(DispatchMessages::default()),
            notify_invalid_components: true,
        }
    }

    /// Sets the application owners used by `require_application_owner`.
    pub fn with_owners(mut self, owners: impl IntoIterator<Item = UserId>) -> Self {
        self.env.owners = owners.into_iter().collect();
        self
    }

    pub fn with_messages(mut self, messages: DispatchMessages) -> Self {
        self.messages = Arc::new(messages);
        self
    }

    /// Whether unusable component identifiers get a reply (default) or are
    /// ignored silently.
    pub fn notify_invalid_components(mut self, notify: bool) -> Self {
        self.notify_invalid_components = notify;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Dispatches one event.
    pub async fn dispatch(&self, event: PlatformEvent) -> DispatchOutcome {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            event_name = %event.event_name(),
            interaction_id = %event.interaction_id(),
            user = %event.user().id,
        );

        async {
            let outcome = match event {
                PlatformEvent::Slash(slash) => self.dispatch_slash(slash).await,
                PlatformEvent::Component(component) => self.dispatch_component(component).await,
            };
            debug!(outcome = ?outcome, "Dispatch finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn dispatch_slash(&self, event: SlashEvent) -> DispatchOutcome {
        let command = match self.registry.resolve_in(&event.command, event.guild_id) {
            Ok(command) => command,
            Err(e) => {
                warn!(command = %event.command, "{e}");
                self.respond(&event.interaction_id, self.messages.unknown_command_reply())
                    .await;
                return DispatchOutcome::UnknownCommand {
                    command: event.command,
                };
            }
        };

        let resolved = match options::resolve(command.options(), &event.options) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(command = %command.name(), option = %e.option(), "Invalid options: {e}");
                self.respond(
                    &event.interaction_id,
                    self.messages.validation_failed_reply(&e),
                )
                .await;
                return DispatchOutcome::InvalidOptions(e);
            }
        };

        let ctx = Arc::new(InvocationContext::new(
            event,
            Arc::clone(&command),
            resolved,
            self.env.clone(),
        ));

        if let Err(failure) = run_checks(command.checks(), &*ctx) {
            debug!(command = %command.name(), check = %failure.name, "Check failed");
            self.respond(
                &ctx.event().interaction_id,
                self.messages.check_failed_reply(&failure),
            )
            .await;
            return DispatchOutcome::CheckFailed(failure);
        }

        debug!(command = %command.name(), "Invoking slash handler");
        let interaction_id = ctx.event().interaction_id.clone();
        if let Err(e) = (command.handler())(ctx).await {
            return self.handler_skipped(&interaction_id, e).await;
        }
        DispatchOutcome::Invoked {
            command: command.name().to_string(),
        }
    }

    async fn dispatch_component(&self, event: ComponentEvent) -> DispatchOutcome {
        let identity = match self.env.codec.decode(&event.custom_id) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(custom_id = %event.custom_id, "Rejected component id: {e}");
                return self.invalid_component(&event, e).await;
            }
        };

        let command = match self.registry.resolve_in(identity.command(), event.guild_id) {
            Ok(command) => command,
            Err(e) => {
                warn!(command = %identity.command(), "Stale component: {e}");
                return self.invalid_component(&event, DecodeError::UnknownCommand).await;
            }
        };

        if let Err(e) = identity.authorize(event.user.id) {
            warn!(command = %command.name(), action = %identity.action(), "{e}");
            self.respond(
                &event.interaction_id,
                self.messages.not_your_component_reply(),
            )
            .await;
            return DispatchOutcome::Unauthorized(e);
        }

        let action = identity.action().to_string();
        let ctx = Arc::new(ComponentContext::new(
            event,
            Arc::clone(&command),
            identity,
            self.env.clone(),
        ));

        if let Err(failure) = run_checks(command.checks(), &*ctx) {
            debug!(command = %command.name(), check = %failure.name, "Check failed");
            self.respond(
                &ctx.event().interaction_id,
                self.messages.check_failed_reply(&failure),
            )
            .await;
            return DispatchOutcome::CheckFailed(failure);
        }

        let Some(handler) = command.components().handler_for(&action) else {
            warn!(command = %command.name(), action = %action, "No handler bound to action");
            if self.notify_invalid_components {
                self.respond(
                    &ctx.event().interaction_id,
                    self.messages.invalid_interaction_reply(),
                )
                .await;
            }
            return DispatchOutcome::UnboundAction {
                command: command.name().to_string(),
                action,
            };
        };

        debug!(command = %command.name(), action = %action, "Invoking component handler");
        let interaction_id = ctx.event().interaction_id.clone();
        if let Err(e) = handler(ctx).await {
            return self.handler_skipped(&interaction_id, e).await;
        }
        DispatchOutcome::Handled {
            command: command.name().to_string(),
            action,
        }
    }

    async fn invalid_component(&self, event: &ComponentEvent, error: DecodeError) -> DispatchOutcome {
        if self.notify_invalid_components {
            self.respond(
                &event.interaction_id,
                self.messages.invalid_interaction_reply(),
            )
            .await;
        }
        DispatchOutcome::InvalidComponent(error)
    }

    /// The interaction still gets an answer when its handler never ran.
    async fn handler_skipped(&self, interaction_id: &str, error: ExtractError) -> DispatchOutcome {
        self.respond(interaction_id, self.messages.invalid_interaction_reply())
            .await;
        DispatchOutcome::HandlerSkipped(error)
    }

    async fn respond(&self, interaction_id: &str, reply: Reply) {
        if let Err(e) = self.env.responder.reply(interaction_id, reply).await {
            error!(interaction_id = %interaction_id, error = %e, "Failed to send reply");
        }
    }
}

impl Service<PlatformEvent> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: PlatformEvent) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(event).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tessera_core::{
        Component, GuildId, Member, MemoryResponder, Permission, ResponderCall, User,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::command::SlashCommand;
    use crate::component_id::ComponentIdentity;
    use crate::error::ExtractResult;
    use crate::extractor::{FromContext, Identity, Invoker, SelectedValues};

    /// Append-only log shared between check closures.
    #[derive(Default)]
    struct CheckLog(std::sync::Mutex<Vec<&'static str>>);

    impl CheckLog {
        /// Records `entry` and returns `true`.
        fn push(&self, entry: &'static str) -> bool {
            self.0.lock().unwrap().push(entry);
            true
        }

        fn entries(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Extracts only from guild interactions.
    struct GuildName(String);

    impl<C: crate::context::InteractionContext> FromContext<C> for GuildName {
        fn from_context(ctx: &Arc<C>) -> ExtractResult<Self> {
            Err(ExtractError::custom(format!(
                "{} has no guild name",
                ctx.interaction_id()
            )))
        }
    }

    const U1: u64 = 1;
    const U2: u64 = 2;

    fn say_command() -> SlashCommand {
        SlashCommand::new("say", "Make the bot say something")
            .options(|o| {
                o.required_string("content", "What to say");
            })
            .components(|c| {
                c.danger("delete", "Delete")
                    .restrict_to_invoker()
                    .on_click(|ctx: Arc<ComponentContext>| async move {
                        let _ = ctx.delete_message().await;
                    });
            })
            .handler(|ctx: Arc<InvocationContext>| async move {
                let content: String = ctx.require("content")?;
                Ok::<_, ExtractError>(Reply::text(content).rows(ctx.components()))
            })
    }

    fn dispatcher_with(
        commands: impl IntoIterator<Item = SlashCommand>,
    ) -> (Dispatcher, Arc<MemoryResponder>) {
        let mut registry = CommandRegistry::new();
        for command in commands {
            registry.command(command).unwrap();
        }
        let responder = Arc::new(MemoryResponder::new());
        let dispatcher = Dispatcher::new(Arc::new(registry), responder.clone());
        (dispatcher, responder)
    }

    fn delete_id(user: u64) -> String {
        ComponentIdentity::builder("say")
            .user(UserId(user))
            .action("delete")
            .build()
            .unwrap()
            .encode()
    }

    fn click(custom_id: impl Into<String>, user: u64) -> PlatformEvent {
        ComponentEvent::button("i-click", custom_id, User::new(user, "clicker")).into()
    }

    #[tokio::test]
    async fn test_say_replies_with_content() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let event = SlashEvent::new("i-1", "say", User::new(U1, "alice")).option("content", "hi");

        let outcome = dispatcher.dispatch(event.into()).await;

        assert_eq!(outcome, DispatchOutcome::Invoked { command: "say".into() });
        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text_content().contains("hi"));
        assert!(!replies[0].ephemeral);
    }

    #[tokio::test]
    async fn test_say_renders_restricted_delete_button() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let event = SlashEvent::new("i-1", "say", User::new(U1, "alice")).option("content", "hi");
        dispatcher.dispatch(event.into()).await;

        let reply = &responder.replies()[0];
        let Component::Button(button) = &reply.components[0].components[0] else {
            panic!("expected a button");
        };
        assert_eq!(button.custom_id.as_deref(), Some(delete_id(U1).as_str()));
    }

    #[tokio::test]
    async fn test_delete_by_other_user_is_rejected() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);

        let outcome = dispatcher.dispatch(click(delete_id(U1), U2)).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Unauthorized(AuthorizationError {
                owner: UserId(U1),
                actor: UserId(U2),
            })
        );
        assert_eq!(responder.deletions(), 0);
        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].ephemeral);
    }

    #[tokio::test]
    async fn test_delete_by_owner_runs_once() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);

        let outcome = dispatcher.dispatch(click(delete_id(U1), U1)).await;

        assert!(outcome.is_handled());
        assert_eq!(responder.deletions(), 1);
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_option_names_it() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let event = SlashEvent::new("i-1", "say", User::new(U1, "alice"));

        let outcome = dispatcher.dispatch(event.into()).await;

        assert_eq!(
            outcome,
            DispatchOutcome::InvalidOptions(ValidationError::Missing {
                option: "content".into()
            })
        );
        assert!(responder.replies()[0].text_content().contains("content"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let event = SlashEvent::new("i-1", "shout", User::new(U1, "alice"));

        let outcome = dispatcher.dispatch(event.into()).await;

        assert_eq!(outcome, DispatchOutcome::UnknownCommand { command: "shout".into() });
        assert_eq!(
            responder.replies()[0].content.as_deref(),
            Some("This command is not available.")
        );
    }

    #[tokio::test]
    async fn test_garbage_component_id() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);

        let outcome = dispatcher.dispatch(click("garbage", U1)).await;

        assert_eq!(outcome, DispatchOutcome::InvalidComponent(DecodeError::Malformed));
        assert_eq!(
            responder.replies()[0].content.as_deref(),
            Some("This interaction is no longer valid.")
        );
    }

    #[tokio::test]
    async fn test_stale_command_is_treated_as_invalid() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let stale = ComponentIdentity::builder("removed")
            .action("delete")
            .build()
            .unwrap()
            .encode();

        let outcome = dispatcher.dispatch(click(stale, U1)).await;

        assert_eq!(outcome, DispatchOutcome::InvalidComponent(DecodeError::UnknownCommand));
        assert_eq!(
            responder.replies()[0].content.as_deref(),
            Some("This interaction is no longer valid.")
        );
    }

    #[tokio::test]
    async fn test_silent_invalid_components() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let dispatcher = dispatcher.notify_invalid_components(false);

        let outcome = dispatcher.dispatch(click("garbage", U1)).await;

        assert!(matches!(outcome, DispatchOutcome::InvalidComponent(_)));
        assert!(responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_authorization_precedes_checks() {
        let checked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checked);
        let command = say_command().checks(move |c| {
            c.check("counted", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            });
        });
        let (dispatcher, responder) = dispatcher_with([command]);

        let outcome = dispatcher.dispatch(click(delete_id(U1), U2)).await;
        assert!(matches!(outcome, DispatchOutcome::Unauthorized(_)));
        assert_eq!(checked.load(Ordering::SeqCst), 0);

        dispatcher.dispatch(click(delete_id(U1), U1)).await;
        assert_eq!(checked.load(Ordering::SeqCst), 1);
        assert_eq!(responder.deletions(), 1);
    }

    #[tokio::test]
    async fn test_checks_run_in_order_and_stop() {
        let order = Arc::new(CheckLog::default());
        let (a, b, c) = (order.clone(), order.clone(), order.clone());
        let command = say_command().checks(move |s| {
            s.check("first", move |_| a.push("first"))
                .check_with_reason("second", "Not today.", move |_| !b.push("second"))
                .check("third", move |_| c.push("third"));
        });
        let (dispatcher, responder) = dispatcher_with([command]);
        let event = SlashEvent::new("i-1", "say", User::new(U1, "alice")).option("content", "hi");

        let outcome = dispatcher.dispatch(event.into()).await;

        let DispatchOutcome::CheckFailed(failure) = outcome else {
            panic!("expected a check failure");
        };
        assert_eq!(failure.name, "second");
        assert_eq!(order.entries(), ["first", "second"]);
        let text = responder.replies()[0].text_content();
        assert!(text.contains("check failed: second"));
        assert!(text.contains("Not today."));
    }

    #[tokio::test]
    async fn test_checks_apply_to_components() {
        let command = say_command().checks(|c| {
            c.guild_only();
        });
        let (dispatcher, responder) = dispatcher_with([command]);

        let outcome = dispatcher.dispatch(click(delete_id(U1), U1)).await;

        assert!(matches!(outcome, DispatchOutcome::CheckFailed(ref f) if f.name == "guild_only"));
        assert_eq!(responder.deletions(), 0);
    }

    #[tokio::test]
    async fn test_guild_scoped_command_outside_guild() {
        let (dispatcher, _) = dispatcher_with([say_command().guild(GuildId(10))]);
        let member = Member {
            permissions: vec![Permission::SendMessages],
            ..Member::default()
        };

        let elsewhere = SlashEvent::new("i-1", "say", User::new(U1, "alice"))
            .option("content", "hi")
            .in_guild(GuildId(11), member.clone());
        assert!(matches!(
            dispatcher.dispatch(elsewhere.into()).await,
            DispatchOutcome::UnknownCommand { .. }
        ));

        let home = SlashEvent::new("i-2", "say", User::new(U1, "alice"))
            .option("content", "hi")
            .in_guild(GuildId(10), member);
        assert!(dispatcher.dispatch(home.into()).await.is_handled());
    }

    #[tokio::test]
    async fn test_run_time_identity_with_fallback() {
        let command = SlashCommand::new("poll", "Run a poll")
            .handler(|ctx: Arc<InvocationContext>| async move {
                let id = ctx.component_id("vote").field("q", 1).build().unwrap();
                assert_eq!(id.command(), "poll");
                "started".to_string()
            })
            .components(|c| {
                c.on_action("vote", |Invoker(user): Invoker, Identity(id): Identity| async move {
                    format!("{} voted on {}", user.name, id.get("q").unwrap_or("?"))
                })
                .fallback(|ctx: Arc<ComponentContext>| async move {
                    format!("fallback for {}", ctx.action())
                });
            });
        let (dispatcher, responder) = dispatcher_with([command]);

        let vote = ComponentIdentity::builder("poll")
            .action("vote")
            .field("q", 1)
            .build()
            .unwrap();
        let outcome = dispatcher.dispatch(click(vote.encode(), U2)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                command: "poll".into(),
                action: "vote".into()
            }
        );

        let other = ComponentIdentity::builder("poll").action("close").build().unwrap();
        dispatcher.dispatch(click(other.encode(), U2)).await;

        let replies: Vec<_> = responder.replies().iter().map(Reply::text_content).collect();
        assert_eq!(replies, ["clicker voted on 1", "fallback for close"]);
    }

    #[tokio::test]
    async fn test_unbound_action_without_fallback() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let id = ComponentIdentity::builder("say").action("edit").build().unwrap();

        let outcome = dispatcher.dispatch(click(id.encode(), U1)).await;

        assert_eq!(
            outcome,
            DispatchOutcome::UnboundAction {
                command: "say".into(),
                action: "edit".into()
            }
        );
        assert_eq!(responder.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_select_menu_values() {
        let command = SlashCommand::new("color", "Pick a color")
            .components(|c| {
                c.select_menu("pick", "Choose")
                    .option("Red", "red")
                    .option("Blue", "blue")
                    .on_click(|SelectedValues(values): SelectedValues| async move {
                        Reply::text(values.join(",")).ephemeral(true)
                    });
            })
            .handler(|ctx: Arc<InvocationContext>| async move {
                Reply::text("pick one").rows(ctx.components())
            });
        let (dispatcher, responder) = dispatcher_with([command]);

        dispatcher
            .dispatch(SlashEvent::new("i-1", "color", User::new(U1, "alice")).into())
            .await;
        let menu_id = responder.replies()[0].components[0].components[0]
            .custom_id()
            .unwrap()
            .to_string();

        let event = ComponentEvent::select_menu("i-2", menu_id, User::new(U2, "bob"), vec![
            "red".into(),
            "blue".into(),
        ]);
        assert!(dispatcher.dispatch(event.into()).await.is_handled());
        assert_eq!(responder.replies()[1].text_content(), "red,blue");
    }

    #[tokio::test]
    async fn test_owner_check_uses_configured_owners() {
        let command = SlashCommand::new("shutdown", "Stop the bot")
            .checks(|c| {
                c.require_application_owner();
            })
            .handler(|| async { "bye".to_string() });
        let (dispatcher, _) = dispatcher_with([command]);
        let dispatcher = dispatcher.with_owners([UserId(U1)]);

        let by_owner = SlashEvent::new("i-1", "shutdown", User::new(U1, "owner"));
        assert!(dispatcher.dispatch(by_owner.into()).await.is_handled());

        let by_other = SlashEvent::new("i-2", "shutdown", User::new(U2, "other"));
        assert!(matches!(
            dispatcher.dispatch(by_other.into()).await,
            DispatchOutcome::CheckFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_dispatcher_as_tower_service() {
        let (dispatcher, responder) = dispatcher_with([say_command()]);
        let event = SlashEvent::new("i-1", "say", User::new(U1, "alice")).option("content", "hi");

        let outcome = dispatcher.oneshot(event.into()).await.unwrap();

        assert!(outcome.is_handled());
        assert!(matches!(responder.calls()[0], ResponderCall::Reply { .. }));
    }

    #[tokio::test]
    async fn test_failed_extraction_is_reported_and_answered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (slash_calls, click_calls) = (Arc::clone(&calls), Arc::clone(&calls));
        let command = SlashCommand::new("greet", "Greet the guild")
            .components(|c| {
                c.primary("wave", "Wave")
                    .on_click(move |GuildName(name): GuildName| async move {
                        click_calls.fetch_add(1, Ordering::SeqCst);
                        name
                    });
            })
            .handler(move |GuildName(name): GuildName| async move {
                slash_calls.fetch_add(1, Ordering::SeqCst);
                name
            });
        let (dispatcher, responder) = dispatcher_with([command]);

        let outcome = dispatcher
            .dispatch(SlashEvent::new("i-1", "greet", User::new(U1, "alice")).into())
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::HandlerSkipped(ExtractError::custom("i-1 has no guild name"))
        );
        assert!(!outcome.is_handled());

        let wave = ComponentIdentity::builder("greet").action("wave").build().unwrap();
        let outcome = dispatcher.dispatch(click(wave.encode(), U1)).await;
        assert!(matches!(outcome, DispatchOutcome::HandlerSkipped(_)));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let replies: Vec<_> = responder.replies().iter().map(Reply::text_content).collect();
        assert_eq!(replies, [
            "This interaction is no longer valid.",
            "This interaction is no longer valid."
        ]);
    }
}
