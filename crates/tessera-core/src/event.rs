//! Inbound platform events.
//!
//! The platform delivers two unrelated kinds of interaction:
//!
//! - [`SlashEvent`] – a user invoked a slash command with some options
//! - [`ComponentEvent`] – a user clicked a button or used a select menu;
//!   the only link back to the command that created the component is the
//!   opaque `custom_id` string
//!
//! Both are wrapped in [`PlatformEvent`] when handed to the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ChannelId, GuildId, Member, MessageId, User};

/// One option value as supplied by the platform, before schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOption {
    pub name: String,
    pub value: Value,
}

impl RawOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A slash-command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlashEvent {
    pub interaction_id: String,
    /// The invoked command name.
    pub command: String,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub user: User,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

impl SlashEvent {
    /// Creates an invocation with no options, outside any guild.
    pub fn new(interaction_id: impl Into<String>, command: impl Into<String>, user: User) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            command: command.into(),
            options: Vec::new(),
            user,
            member: None,
            guild_id: None,
            channel_id: None,
        }
    }

    /// Adds an option value (builder pattern).
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.push(RawOption::new(name, value));
        self
    }

    /// Places the invocation in a guild with the given member data.
    pub fn in_guild(mut self, guild_id: impl Into<GuildId>, member: Member) -> Self {
        self.guild_id = Some(guild_id.into());
        self.member = Some(member);
        self
    }

    pub fn raw_option(&self, name: &str) -> Option<&RawOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Which kind of component produced a [`ComponentEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Button,
    SelectMenu {
        #[serde(default)]
        values: Vec<String>,
    },
}

/// A component interaction (button click or select-menu choice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEvent {
    pub interaction_id: String,
    /// The opaque identifier chosen when the component was built. Untrusted.
    pub custom_id: String,
    pub kind: ComponentKind,
    pub user: User,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// The message carrying the component.
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

impl ComponentEvent {
    /// Creates a button click outside any guild.
    pub fn button(
        interaction_id: impl Into<String>,
        custom_id: impl Into<String>,
        user: User,
    ) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            custom_id: custom_id.into(),
            kind: ComponentKind::Button,
            user,
            member: None,
            guild_id: None,
            channel_id: None,
            message_id: None,
        }
    }

    /// Creates a select-menu interaction outside any guild.
    pub fn select_menu(
        interaction_id: impl Into<String>,
        custom_id: impl Into<String>,
        user: User,
        values: Vec<String>,
    ) -> Self {
        Self {
            kind: ComponentKind::SelectMenu { values },
            ..Self::button(interaction_id, custom_id, user)
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<GuildId>, member: Member) -> Self {
        self.guild_id = Some(guild_id.into());
        self.member = Some(member);
        self
    }

    pub fn on_message(mut self, message_id: impl Into<MessageId>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Values chosen in a select menu; empty for buttons.
    pub fn selected_values(&self) -> &[String] {
        match &self.kind {
            ComponentKind::Button => &[],
            ComponentKind::SelectMenu { values } => values,
        }
    }
}

/// Any event the dispatcher accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlatformEvent {
    Slash(SlashEvent),
    Component(ComponentEvent),
}

impl PlatformEvent {
    /// Returns a short static name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Slash(_) => "slash",
            Self::Component(_) => "component",
        }
    }

    pub fn interaction_id(&self) -> &str {
        match self {
            Self::Slash(e) => &e.interaction_id,
            Self::Component(e) => &e.interaction_id,
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Self::Slash(e) => &e.user,
            Self::Component(e) => &e.user,
        }
    }
}

impl From<SlashEvent> for PlatformEvent {
    fn from(event: SlashEvent) -> Self {
        Self::Slash(event)
    }
}

impl From<ComponentEvent> for PlatformEvent {
    fn from(event: ComponentEvent) -> Self {
        Self::Component(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;

    #[test]
    fn test_slash_event_from_json() {
        let json = r#"{
            "event": "slash",
            "interaction_id": "i-1",
            "command": "say",
            "options": [{ "name": "content", "value": "hi" }],
            "user": { "id": 42, "name": "alice" }
        }"#;
        let event: PlatformEvent = serde_json::from_str(json).unwrap();
        let PlatformEvent::Slash(slash) = event else {
            panic!("expected slash event");
        };
        assert_eq!(slash.command, "say");
        assert_eq!(slash.user.id, UserId(42));
        assert!(!slash.user.bot);
        assert_eq!(slash.raw_option("content").unwrap().value, "hi");
        assert!(slash.guild_id.is_none());
    }

    #[test]
    fn test_component_event_from_json() {
        let json = r#"{
            "event": "component",
            "interaction_id": "i-2",
            "custom_id": "abc",
            "kind": { "type": "select_menu", "values": ["a", "b"] },
            "user": { "id": 7, "name": "bob" }
        }"#;
        let event: PlatformEvent = serde_json::from_str(json).unwrap();
        let PlatformEvent::Component(component) = event else {
            panic!("expected component event");
        };
        assert_eq!(component.custom_id, "abc");
        assert_eq!(component.selected_values(), ["a", "b"]);

        let encoded = serde_json::to_string(&PlatformEvent::Component(component.clone())).unwrap();
        let decoded: PlatformEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, PlatformEvent::Component(component));
    }

    #[test]
    fn test_select_menu_builder() {
        let event = ComponentEvent::select_menu("i-2", "abc", User::new(7, "bob"), vec![
            "a".into(),
            "b".into(),
        ]);
        assert_eq!(event.selected_values(), ["a", "b"]);
        assert!(matches!(event.kind, ComponentKind::SelectMenu { .. }));
    }

    #[test]
    fn test_button_has_no_selected_values() {
        let event = ComponentEvent::button("i-3", "abc", User::new(1, "carol"));
        assert!(event.selected_values().is_empty());
        assert_eq!(PlatformEvent::from(event).event_name(), "component");
    }
}
