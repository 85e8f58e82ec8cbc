//! The concurrent event loop.
//!
//! Commands are registered on a [`RuntimeBuilder`]; building freezes them
//! into one shared registry and a [`Dispatcher`] configured from
//! [`TesseraConfig`]. Every incoming event then runs as its own tokio task.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tessera_runtime::SlashRuntime;
//!
//! let runtime = SlashRuntime::builder()
//!     .config_file("tessera.toml")
//!     .command(say_command())
//!     .build(responder)?;
//!
//! // `events` is fed by the transport.
//! runtime.run(events).await;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info};

use tessera_core::{BoxedResponder, PlatformEvent};
use tessera_framework::{CommandRegistry, DispatchOutcome, Dispatcher, SlashCommand};

use crate::config::{ConfigLoader, TesseraConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A running set of slash commands.
///
/// Cheap to share: dispatches only read the frozen registry and the
/// configuration.
#[derive(Debug, Clone)]
pub struct SlashRuntime {
    config: Arc<TesseraConfig>,
    dispatcher: Dispatcher,
}

impl SlashRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatches one event on the current task.
    pub async fn dispatch(&self, event: PlatformEvent) -> DispatchOutcome {
        self.dispatcher.dispatch(event).await
    }

    /// Dispatches one event on its own task.
    ///
    /// A panicking handler only takes down its own task; the panic surfaces
    /// as the handle's `JoinError`.
    pub fn spawn(&self, event: PlatformEvent) -> JoinHandle<DispatchOutcome> {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move { dispatcher.dispatch(event).await })
    }

    /// Dispatches events until the channel closes or a shutdown signal
    /// (Ctrl+C, or SIGTERM on unix) arrives.
    pub async fn run(&self, events: mpsc::Receiver<PlatformEvent>) {
        info!(
            commands = self.dispatcher.registry().len(),
            "Tessera runtime is now running. Press Ctrl+C to stop."
        );
        self.run_until(events, wait_for_shutdown()).await;
    }

    /// Dispatches events until the channel closes or `shutdown` completes.
    ///
    /// Dispatches already in flight are awaited before returning. Returns
    /// the number of events received.
    pub async fn run_until<F>(&self, mut events: mpsc::Receiver<PlatformEvent>, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut tasks = JoinSet::new();
        let mut received = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting events");
                    break;
                }
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    log_finished(result);
                }
                event = events.recv() => match event {
                    Some(event) => {
                        received += 1;
                        let dispatcher = self.dispatcher.clone();
                        tasks.spawn(async move { dispatcher.dispatch(event).await });
                    }
                    None => {
                        debug!("Event channel closed");
                        break;
                    }
                },
            }
        }

        if !tasks.is_empty() {
            debug!(pending = tasks.len(), "Waiting for in-flight dispatches");
        }
        while let Some(result) = tasks.join_next().await {
            log_finished(result);
        }

        info!(events = received, "Tessera runtime stopped");
        received
    }
}

fn log_finished(result: Result<DispatchOutcome, JoinError>) {
    match result {
        Ok(outcome) => debug!(handled = outcome.is_handled(), ?outcome, "Dispatch finished"),
        Err(e) if e.is_panic() => error!(error = %e, "Dispatch task panicked"),
        Err(e) => debug!(error = %e, "Dispatch task cancelled"),
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
///
/// A signal whose handler cannot be registered is logged and never fires.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Collects configuration and commands for a [`SlashRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<TesseraConfig>,
    commands: Vec<SlashCommand>,
    init_logging: bool,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Searches the current directory for configuration by default.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            commands: Vec::new(),
            init_logging: true,
        }
    }

    /// Uses this configuration instead of loading one. It is still validated.
    pub fn config(mut self, config: TesseraConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically, under files and environment.
    pub fn merge(mut self, config: TesseraConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Leaves the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn command(mut self, command: SlashCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = SlashCommand>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// Loads the configuration, initializes logging and registers every
    /// command. Any invalid command stops the build.
    pub fn build(self, responder: BoxedResponder) -> RuntimeResult<SlashRuntime> {
        let config = match self.config {
            Some(config) => {
                validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let mut registry = CommandRegistry::with_max_id_length(config.components.max_id_length);
        for command in self.commands {
            registry.command(command)?;
        }

        let dispatcher = Dispatcher::new(Arc::new(registry), responder)
            .with_owners(config.dispatch.owners.iter().copied())
            .with_messages(config.messages.clone())
            .notify_invalid_components(config.dispatch.notify_invalid_components);

        info!(
            commands = dispatcher.registry().len(),
            log_level = %config.logging.level,
            max_id_length = config.components.max_id_length,
            "Runtime initialized from configuration"
        );

        Ok(SlashRuntime {
            config: Arc::new(config),
            dispatcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tessera_core::{ComponentEvent, MemoryResponder, Reply, SlashEvent, User, UserId};
    use tessera_framework::{
        ComponentContext, ConfigurationError, DecodeError, ExtractError, InvocationContext,
    };

    use super::*;
    use crate::error::RuntimeError;

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

    async fn explode() {
        panic!("handler failed");
    }

    fn runtime_with(
        config: TesseraConfig,
        commands: impl IntoIterator<Item = SlashCommand>,
    ) -> RuntimeResult<(SlashRuntime, Arc<MemoryResponder>)> {
        let responder = Arc::new(MemoryResponder::new());
        let runtime = SlashRuntime::builder()
            .config(config)
            .without_logging()
            .commands(commands)
            .build(responder.clone())?;
        Ok((runtime, responder))
    }

    fn say(interaction_id: &str, content: &str) -> PlatformEvent {
        SlashEvent::new(interaction_id, "say", User::new(1, "alice"))
            .option("content", content)
            .into()
    }

    #[tokio::test]
    async fn test_spawned_dispatch_replies() {
        let (runtime, responder) = runtime_with(TesseraConfig::default(), [say_command()]).unwrap();

        let outcome = runtime.spawn(say("i-1", "hi")).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Invoked { command: "say".into() });
        assert!(responder.replies()[0].text_content().contains("hi"));
    }

    #[test]
    fn test_duplicate_command_fails_build() {
        let err = runtime_with(TesseraConfig::default(), [say_command(), say_command()]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Configuration(ConfigurationError::DuplicateCommand(_))
        ));
    }

    #[test]
    fn test_configured_id_budget_applies() {
        let mut config = TesseraConfig::default();
        config.components.max_id_length = 30;
        let err = runtime_with(config, [say_command()]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Configuration(ConfigurationError::ComponentIdTooLong { limit: 30, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let (runtime, responder) = runtime_with(TesseraConfig::default(), [say_command()]).unwrap();
        let (tx, rx) = mpsc::channel(8);
        for i in 0..3 {
            tx.send(say(&format!("i-{i}"), "hi")).await.unwrap();
        }
        drop(tx);

        let received = runtime.run_until(rx, std::future::pending::<()>()).await;

        assert_eq!(received, 3);
        assert_eq!(responder.replies().len(), 3);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let boom = SlashCommand::new("boom", "Always fails").handler(explode);
        let (runtime, responder) =
            runtime_with(TesseraConfig::default(), [say_command(), boom]).unwrap();
        let (tx, rx) = mpsc::channel(8);
        tx.send(SlashEvent::new("i-boom", "boom", User::new(1, "alice")).into())
            .await
            .unwrap();
        tx.send(say("i-say", "still here")).await.unwrap();
        drop(tx);

        assert_eq!(runtime.run_until(rx, std::future::pending::<()>()).await, 2);

        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text_content().contains("still here"));

        let err = runtime
            .spawn(SlashEvent::new("i-boom-2", "boom", User::new(1, "alice")).into())
            .await
            .unwrap_err();
        assert!(err.is_panic());
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting_events() {
        let (runtime, responder) = runtime_with(TesseraConfig::default(), [say_command()]).unwrap();
        let (tx, rx) = mpsc::channel(8);

        let received = runtime.run_until(rx, async {}).await;
        tx.send(say("i-late", "late")).await.unwrap_err();

        assert_eq!(received, 0);
        assert!(responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_owners_from_config() {
        let mut config = TesseraConfig::default();
        config.dispatch.owners = vec![UserId(7)];
        let admin = SlashCommand::new("shutdown", "Owner only")
            .checks(|c| {
                c.require_application_owner();
            })
            .handler(|| async { Reply::text("bye") });
        let (runtime, _responder) = runtime_with(config, [admin]).unwrap();

        let owner = runtime
            .dispatch(SlashEvent::new("i-1", "shutdown", User::new(7, "owner")).into())
            .await;
        let stranger = runtime
            .dispatch(SlashEvent::new("i-2", "shutdown", User::new(8, "stranger")).into())
            .await;

        assert!(owner.is_handled());
        assert!(matches!(stranger, DispatchOutcome::CheckFailed(_)));
    }

    #[tokio::test]
    async fn test_silent_invalid_components_from_config() {
        let mut config = TesseraConfig::default();
        config.dispatch.notify_invalid_components = false;
        let (runtime, responder) = runtime_with(config, [say_command()]).unwrap();

        let outcome = runtime
            .dispatch(ComponentEvent::button("i-1", "garbage", User::new(1, "alice")).into())
            .await;

        assert_eq!(outcome, DispatchOutcome::InvalidComponent(DecodeError::Malformed));
        assert!(responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_messages_from_config() {
        let mut config = TesseraConfig::default();
        config.messages.unknown_command = "No such command.".to_string();
        let (runtime, responder) = runtime_with(config, [say_command()]).unwrap();

        runtime
            .dispatch(SlashEvent::new("i-1", "nope", User::new(1, "alice")).into())
            .await;

        assert_eq!(responder.replies()[0].text_content(), "No such command.");
    }
}
