//! User-visible failure replies.
//!
//! Every failure reply is ephemeral. The strings are configurable through
//! the runtime's `[messages]` section.

use serde::{Deserialize, Serialize};

use tessera_core::{Embed, Reply};

use crate::error::{CheckFailure, ValidationError};

/// Texts used when a dispatch ends without reaching a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchMessages {
    /// Reply to a slash command that is not registered.
    pub unknown_command: String,
    /// Reply to a component whose identity cannot be used.
    pub invalid_interaction: String,
    /// Reply to a restricted component used by someone else.
    pub not_your_component: String,
    /// Embed title for a failed check.
    pub check_failed_title: String,
    /// Embed title for an invalid option.
    pub validation_failed_title: String,
    /// Embed color for failures.
    pub failure_color: u32,
}

impl Default for DispatchMessages {
    fn default() -> Self {
        Self {
            unknown_command: "This command is not available.".to_string(),
            invalid_interaction: "This interaction is no longer valid.".to_string(),
            not_your_component: "This component belongs to someone else.".to_string(),
            check_failed_title: "Check failed".to_string(),
            validation_failed_title: "Invalid option".to_string(),
            failure_color: 0xED4245,
        }
    }
}

impl DispatchMessages {
    pub fn unknown_command_reply(&self) -> Reply {
        Reply::text(&self.unknown_command).ephemeral(true)
    }

    pub fn invalid_interaction_reply(&self) -> Reply {
        Reply::text(&self.invalid_interaction).ephemeral(true)
    }

    pub fn not_your_component_reply(&self) -> Reply {
        Reply::text(&self.not_your_component).ephemeral(true)
    }

    /// Names the failed check, followed by its reason when one was given.
    pub fn check_failed_reply(&self, failure: &CheckFailure) -> Reply {
        let description = match &failure.reason {
            Some(reason) => format!("{failure}\n{reason}"),
            None => failure.to_string(),
        };
        self.failure_embed(&self.check_failed_title, description)
    }

    /// Names the offending option.
    pub fn validation_failed_reply(&self, error: &ValidationError) -> Reply {
        self.failure_embed(&self.validation_failed_title, error.to_string())
    }

    fn failure_embed(&self, title: &str, description: String) -> Reply {
        Reply::embed(
            Embed::new()
                .title(title)
                .description(description)
                .color(self.failure_color),
        )
        .ephemeral(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_failed_reply_names_check() {
        let messages = DispatchMessages::default();
        let reply = messages.check_failed_reply(&CheckFailure {
            name: "guild_only".into(),
            reason: Some("Servers only.".into()),
        });
        assert!(reply.ephemeral);
        let text = reply.text_content();
        assert!(text.contains("check failed: guild_only"));
        assert!(text.contains("Servers only."));
    }

    #[test]
    fn test_validation_reply_names_option() {
        let reply = DispatchMessages::default().validation_failed_reply(&ValidationError::Missing {
            option: "content".into(),
        });
        assert!(reply.text_content().contains("content"));
        assert_eq!(reply.embeds[0].color, Some(0xED4245));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let messages: DispatchMessages =
            serde_json::from_str(r#"{ "unknown_command": "Nope." }"#).unwrap();
        assert_eq!(messages.unknown_command, "Nope.");
        assert_eq!(
            messages.invalid_interaction,
            DispatchMessages::default().invalid_interaction
        );
    }
}
