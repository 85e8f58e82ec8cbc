//! Slash command definitions.
//!
//! A command is declared once, at startup, through [`SlashCommand`]:
//!
//! ```rust,ignore
//! let say = SlashCommand::new("say", "Make the bot say something")
//!     .options(|o| {
//!         o.required_string("content", "What to say");
//!     })
//!     .checks(|c| {
//!         c.reject_bots();
//!     })
//!     .components(|c| {
//!         c.danger("delete", "Delete")
//!             .restrict_to_invoker()
//!             .on_click(|ctx: Arc<ComponentContext>| async move {
//!                 let _ = ctx.delete_message().await;
//!             });
//!     })
//!     .handler(|ctx: Arc<InvocationContext>| async move {
//!         let content: String = ctx.require("content")?;
//!         Ok::<_, ExtractError>(Reply::text(content).rows(ctx.components()))
//!     })
//!     .build()?;
//! ```
//!
//! [`SlashCommand::build`] validates the whole definition and produces an
//! immutable [`CommandDefinition`], which the
//! [`CommandRegistry`](crate::registry::CommandRegistry) then owns.

pub mod checks;
pub mod components;
pub mod options;

use std::fmt;

use serde::Serialize;

use tessera_core::GuildId;

use crate::context::InvocationContext;
use crate::error::ConfigurationError;
use crate::handler::{BoxedHandler, Handler, into_handler};

pub use checks::{Check, CheckFn, ChecksScope, run_checks};
pub use components::{ComponentSet, ComponentTemplate, ComponentsScope, TemplateKind, render_rows};
pub use options::{
    FromOptionValue, OptionChoice, OptionManifest, OptionSpec, OptionType, OptionValue,
    OptionsScope, ResolvedOptions,
};

/// Longest command, option or action name.
pub const MAX_NAME_LEN: usize = 32;
/// Longest command or option description.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Names are 1 to 32 characters of lowercase ASCII letters, digits, `_` or `-`.
pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<(), ConfigurationError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.len() > MAX_NAME_LEN {
        "must be at most 32 characters"
    } else if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    {
        "may only contain a-z, 0-9, '_' and '-'"
    } else {
        return Ok(());
    };

    Err(ConfigurationError::InvalidName {
        kind,
        name: name.to_string(),
        reason,
    })
}

fn validate_description(kind: &'static str, description: &str) -> Result<(), ConfigurationError> {
    let reason = if description.trim().is_empty() {
        "must not be empty"
    } else if description.chars().count() > MAX_DESCRIPTION_LEN {
        "must be at most 100 characters"
    } else {
        return Ok(());
    };

    Err(ConfigurationError::InvalidName {
        kind,
        name: description.to_string(),
        reason,
    })
}

/// An immutable, validated command.
pub struct CommandDefinition {
    name: String,
    description: String,
    guild: Option<GuildId>,
    options: Vec<OptionSpec>,
    checks: Vec<Check>,
    components: ComponentSet,
    handler: BoxedHandler<InvocationContext>,
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("guild", &self.guild)
            .field("options", &self.options)
            .field("checks", &self.checks)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl CommandDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The guild the command is limited to, if any.
    pub fn guild(&self) -> Option<GuildId> {
        self.guild
    }

    /// Whether the command may be invoked from `guild` (`None` for DMs).
    pub fn is_available_in(&self, guild: Option<GuildId>) -> bool {
        self.guild.is_none() || self.guild == guild
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn handler(&self) -> &BoxedHandler<InvocationContext> {
        &self.handler
    }

    /// Serialisable description used to upsert the command with the platform.
    pub fn manifest(&self) -> CommandManifest {
        CommandManifest {
            name: self.name.clone(),
            description: self.description.clone(),
            guild_id: self.guild,
            options: self.options.iter().map(OptionSpec::manifest).collect(),
        }
    }
}

/// Serialisable description of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandManifest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    pub options: Vec<OptionManifest>,
}

/// Builder for a [`CommandDefinition`].
///
/// Scope closures run immediately. Calling a scope method twice appends to
/// the same scope.
pub struct SlashCommand {
    name: String,
    description: String,
    guild: Option<GuildId>,
    options: OptionsScope,
    checks: ChecksScope,
    components: ComponentsScope,
    handler: Option<BoxedHandler<InvocationContext>>,
}

impl fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.name)
            .field("guild", &self.guild)
            .field("options", &self.options)
            .field("checks", &self.checks)
            .field("components", &self.components)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl SlashCommand {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            guild: None,
            options: OptionsScope::default(),
            checks: ChecksScope::default(),
            components: ComponentsScope::default(),
            handler: None,
        }
    }

    /// Limits the command to one guild.
    pub fn guild(mut self, guild: impl Into<GuildId>) -> Self {
        self.guild = Some(guild.into());
        self
    }

    pub fn options(mut self, configure: impl FnOnce(&mut OptionsScope)) -> Self {
        configure(&mut self.options);
        self
    }

    pub fn checks(mut self, configure: impl FnOnce(&mut ChecksScope)) -> Self {
        configure(&mut self.checks);
        self
    }

    pub fn components(mut self, configure: impl FnOnce(&mut ComponentsScope)) -> Self {
        configure(&mut self.components);
        self
    }

    /// Sets the slash handler.
    pub fn handler<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<InvocationContext, T>,
        T: 'static,
    {
        self.handler = Some(into_handler(handler));
        self
    }

    /// Validates the definition.
    pub fn build(self) -> Result<CommandDefinition, ConfigurationError> {
        validate_name("command", &self.name)?;
        validate_description("description", &self.description)?;

        let options = self.options.into_entries();
        let mut seen_optional = false;
        for (i, option) in options.iter().enumerate() {
            validate_name("option", option.name())?;
            validate_description("option description", option.description())?;
            if options[..i].iter().any(|o| o.name() == option.name()) {
                return Err(ConfigurationError::DuplicateOption {
                    command: self.name,
                    option: option.name().to_string(),
                });
            }
            if option.is_required() && seen_optional {
                return Err(ConfigurationError::RequiredAfterOptional {
                    command: self.name,
                    option: option.name().to_string(),
                });
            }
            seen_optional |= !option.is_required();
            option.check_constraints(&self.name)?;
        }

        let checks = self.checks.into_checks(&self.name)?;
        let components = self.components.into_set(&self.name)?;
        let handler = self
            .handler
            .ok_or_else(|| ConfigurationError::MissingHandler(self.name.clone()))?;

        Ok(CommandDefinition {
            name: self.name,
            description: self.description,
            guild: self.guild,
            options,
            checks,
            components,
            handler,
        })
    }
}
