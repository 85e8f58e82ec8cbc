//! The command registry.
//!
//! Commands are registered once, at startup. The registry is then moved
//! into an `Arc` and shared read-only by every dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use tessera_core::GuildId;

use crate::command::{CommandDefinition, CommandManifest, SlashCommand};
use crate::component_id::{ComponentIdCodec, DEFAULT_MAX_LENGTH};
use crate::error::{ConfigurationError, NotFound};

/// Maps command names to their definitions.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<CommandDefinition>>,
    codec: ComponentIdCodec,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates an empty registry with the default component id budget.
    pub fn new() -> Self {
        Self::with_max_id_length(DEFAULT_MAX_LENGTH)
    }

    /// Creates an empty registry whose component ids must fit in `max_length`.
    pub fn with_max_id_length(max_length: usize) -> Self {
        Self {
            commands: HashMap::new(),
            codec: ComponentIdCodec::new(max_length),
        }
    }

    pub fn codec(&self) -> ComponentIdCodec {
        self.codec
    }

    /// Adds a command.
    ///
    /// Every component template is measured against the id budget with the
    /// longest possible user id, so rendering can never exceed it later.
    pub fn register(&mut self, definition: CommandDefinition) -> Result<(), ConfigurationError> {
        if self.commands.contains_key(definition.name()) {
            return Err(ConfigurationError::DuplicateCommand(
                definition.name().to_string(),
            ));
        }

        for template in definition.components().templates() {
            let length = template.worst_case_len(definition.name());
            if length > self.codec.max_length() {
                return Err(ConfigurationError::ComponentIdTooLong {
                    command: definition.name().to_string(),
                    action: template.action().unwrap_or_default().to_string(),
                    length,
                    limit: self.codec.max_length(),
                });
            }
        }

        debug!(
            command = %definition.name(),
            guild = ?definition.guild(),
            "Registered command"
        );
        self.commands
            .insert(definition.name().to_string(), Arc::new(definition));
        Ok(())
    }

    /// Builds and adds a command.
    pub fn command(&mut self, command: SlashCommand) -> Result<(), ConfigurationError> {
        self.register(command.build()?)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<CommandDefinition>, NotFound> {
        self.commands
            .get(name)
            .cloned()
            .ok_or_else(|| NotFound(name.to_string()))
    }

    /// Resolves a command as seen from `guild`. Guild-scoped commands are
    /// not found anywhere else.
    pub fn resolve_in(
        &self,
        name: &str,
        guild: Option<GuildId>,
    ) -> Result<Arc<CommandDefinition>, NotFound> {
        let command = self.resolve(name)?;
        if command.is_available_in(guild) {
            Ok(command)
        } else {
            Err(NotFound(name.to_string()))
        }
    }

    /// Descriptions of every command, sorted by name.
    pub fn manifest(&self) -> Vec<CommandManifest> {
        let mut manifest: Vec<_> = self.commands.values().map(|c| c.manifest()).collect();
        manifest.sort_by(|a, b| a.name.cmp(&b.name));
        manifest
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
