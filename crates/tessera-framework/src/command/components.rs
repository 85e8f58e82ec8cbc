//! Component templates and action bindings.
//!
//! A [`ComponentsScope`] declares the buttons and select menus a command
//! attaches to its replies, and binds handlers to action tags. Templates
//! are rendered per invocation, since a restricted template embeds the
//! invoking user in its identity.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tessera_core::{ActionRow, Button, ButtonStyle, Component, SelectMenu, UserId};

use crate::command::validate_name;
use crate::component_id::ComponentIdentity;
use crate::context::ComponentContext;
use crate::error::ConfigurationError;
use crate::handler::{BoxedHandler, Handler, into_handler};

/// What a template renders to.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateKind {
    Button(ButtonStyle),
    /// Opens a URL; carries no identity and never dispatches.
    Link { url: String },
    SelectMenu {
        placeholder: String,
        options: Vec<(String, String)>,
        min_values: u8,
        max_values: u8,
    },
}

/// A component declared on a command.
#[derive(Clone)]
pub struct ComponentTemplate {
    kind: TemplateKind,
    action: Option<String>,
    label: String,
    emoji: Option<String>,
    restricted: bool,
    fields: BTreeMap<String, String>,
    handler: Option<BoxedHandler<ComponentContext>>,
}

impl fmt::Debug for ComponentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTemplate")
            .field("kind", &self.kind)
            .field("action", &self.action)
            .field("label", &self.label)
            .field("restricted", &self.restricted)
            .field("fields", &self.fields)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl ComponentTemplate {
    fn new(kind: TemplateKind, action: Option<String>, label: String) -> Self {
        Self {
            kind,
            action,
            label,
            emoji: None,
            restricted: false,
            fields: BTreeMap::new(),
            handler: None,
        }
    }

    /// Only the user the component is rendered for may use it.
    pub fn restrict_to_invoker(&mut self) -> &mut Self {
        self.restricted = true;
        self
    }

    pub fn emoji(&mut self, emoji: impl Into<String>) -> &mut Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Adds a fixed payload entry to the identity.
    pub fn field(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.fields.insert(key.into(), value.to_string());
        self
    }

    /// Adds a choice to a select menu. Ignored for buttons.
    pub fn option(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if let TemplateKind::SelectMenu { options, .. } = &mut self.kind {
            options.push((label.into(), value.into()));
        }
        self
    }

    /// Sets how many select-menu values may be chosen. Ignored for buttons.
    pub fn values(&mut self, min: u8, max: u8) -> &mut Self {
        if let TemplateKind::SelectMenu {
            min_values,
            max_values,
            ..
        } = &mut self.kind
        {
            *min_values = min;
            *max_values = max;
        }
        self
    }

    /// Binds the handler for this template's action.
    pub fn on_click<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<ComponentContext, T>,
        T: 'static,
    {
        self.handler = Some(into_handler(handler));
        self
    }

    pub fn kind(&self) -> &TemplateKind {
        &self.kind
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// The identity this template carries when rendered for `invoker`.
    pub fn identity(&self, command: &str, invoker: UserId) -> Option<ComponentIdentity> {
        let action = self.action.as_ref()?;
        Some(ComponentIdentity::from_parts(
            command.to_string(),
            self.restricted.then_some(invoker),
            action.clone(),
            self.fields.clone(),
        ))
    }

    /// Longest encoded identity this template can produce.
    pub(crate) fn worst_case_len(&self, command: &str) -> usize {
        self.identity(command, UserId(u64::MAX))
            .map_or(0, |id| id.encoded_len())
    }

    /// Renders the template for one user.
    pub fn render(&self, command: &str, invoker: UserId) -> Component {
        let custom_id = self
            .identity(command, invoker)
            .map(|id| id.encode())
            .unwrap_or_default();

        match &self.kind {
            TemplateKind::Button(style) => {
                let mut button = Button::new(*style, custom_id, self.label.clone());
                button.emoji = self.emoji.clone();
                button.into()
            }
            TemplateKind::Link { url } => {
                let mut button = Button::link(url.clone(), self.label.clone());
                button.emoji = self.emoji.clone();
                button.into()
            }
            TemplateKind::SelectMenu {
                placeholder,
                options,
                min_values,
                max_values,
            } => {
                let mut menu = SelectMenu::new(custom_id).placeholder(placeholder.clone());
                for (label, value) in options {
                    menu = menu.option(label.clone(), value.clone());
                }
                menu.min_values = *min_values;
                menu.max_values = *max_values;
                menu.into()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(action) = &self.action {
            validate_name("action", action)?;
        }
        if let Some(key) = self.fields.keys().find(|k| k.is_empty()) {
            return Err(ConfigurationError::InvalidName {
                kind: "payload key",
                name: key.clone(),
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

/// Lays rendered templates out in rows: up to five buttons per row, each
/// select menu on a row of its own.
pub fn render_rows<'a>(
    templates: impl IntoIterator<Item = &'a ComponentTemplate>,
    command: &str,
    invoker: UserId,
) -> Vec<ActionRow> {
    let mut rows = Vec::new();
    let mut current = ActionRow::new();

    for template in templates {
        let component = template.render(command, invoker);
        match component {
            Component::SelectMenu(_) => {
                if !current.is_empty() {
                    rows.push(std::mem::take(&mut current));
                }
                rows.push(ActionRow::new().with(component));
            }
            Component::Button(_) => {
                if current.components.len() == ActionRow::MAX_BUTTONS {
                    rows.push(std::mem::take(&mut current));
                }
                current = current.with(component);
            }
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Templates and action bindings of one command, after validation.
#[derive(Clone, Default)]
pub struct ComponentSet {
    templates: Vec<ComponentTemplate>,
    actions: HashMap<String, BoxedHandler<ComponentContext>>,
    fallback: Option<BoxedHandler<ComponentContext>>,
}

impl fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("ComponentSet")
            .field("templates", &self.templates)
            .field("actions", &actions)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ComponentSet {
    pub fn templates(&self) -> &[ComponentTemplate] {
        &self.templates
    }

    /// The handler bound to `action`, else the fallback.
    pub fn handler_for(&self, action: &str) -> Option<&BoxedHandler<ComponentContext>> {
        self.actions.get(action).or(self.fallback.as_ref())
    }

    pub fn is_bound(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }
}

/// Collects the components of one command.
///
/// ```rust,ignore
/// SlashCommand::new("say", "Say something").components(|c| {
///     c.danger("delete", "Delete")
///         .restrict_to_invoker()
///         .on_click(|ctx: Arc<ComponentContext>| async move {
///             let _ = ctx.delete_message().await;
///         });
/// });
/// ```
#[derive(Default)]
pub struct ComponentsScope {
    templates: Vec<ComponentTemplate>,
    actions: Vec<(String, BoxedHandler<ComponentContext>)>,
    fallback: Option<BoxedHandler<ComponentContext>>,
}

impl fmt::Debug for ComponentsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentsScope")
            .field("templates", &self.templates)
            .field("actions", &self.actions.iter().map(|(a, _)| a).collect::<Vec<_>>())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ComponentsScope {
    pub fn primary(&mut self, action: impl Into<String>, label: impl Into<String>) -> &mut ComponentTemplate {
        self.button(ButtonStyle::Primary, action.into(), label.into())
    }

    pub fn secondary(&mut self, action: impl Into<String>, label: impl Into<String>) -> &mut ComponentTemplate {
        self.button(ButtonStyle::Secondary, action.into(), label.into())
    }

    pub fn success(&mut self, action: impl Into<String>, label: impl Into<String>) -> &mut ComponentTemplate {
        self.button(ButtonStyle::Success, action.into(), label.into())
    }

    pub fn danger(&mut self, action: impl Into<String>, label: impl Into<String>) -> &mut ComponentTemplate {
        self.button(ButtonStyle::Danger, action.into(), label.into())
    }

    pub fn link(&mut self, url: impl Into<String>, label: impl Into<String>) -> &mut ComponentTemplate {
        self.push(ComponentTemplate::new(
            TemplateKind::Link { url: url.into() },
            None,
            label.into(),
        ))
    }

    pub fn select_menu(
        &mut self,
        action: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> &mut ComponentTemplate {
        let placeholder = placeholder.into();
        self.push(ComponentTemplate::new(
            TemplateKind::SelectMenu {
                placeholder: placeholder.clone(),
                options: Vec::new(),
                min_values: 1,
                max_values: 1,
            },
            Some(action.into()),
            placeholder,
        ))
    }

    /// Binds a handler to an action used by identities built at run time.
    pub fn on_action<H, T>(&mut self, action: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler<ComponentContext, T>,
        T: 'static,
    {
        self.actions.push((action.into(), into_handler(handler)));
        self
    }

    /// Handles clicks whose action has no binding.
    pub fn fallback<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<ComponentContext, T>,
        T: 'static,
    {
        self.fallback = Some(into_handler(handler));
        self
    }

    fn button(&mut self, style: ButtonStyle, action: String, label: String) -> &mut ComponentTemplate {
        self.push(ComponentTemplate::new(
            TemplateKind::Button(style),
            Some(action),
            label,
        ))
    }

    fn push(&mut self, template: ComponentTemplate) -> &mut ComponentTemplate {
        let index = self.templates.len();
        self.templates.push(template);
        &mut self.templates[index]
    }

    pub(crate) fn into_set(self, command: &str) -> Result<ComponentSet, ConfigurationError> {
        let mut actions = HashMap::new();

        let template_bindings = self.templates.iter().filter_map(|t| {
            let action = t.action.clone()?;
            t.handler.clone().map(|h| (action, h))
        });

        for (action, handler) in template_bindings.chain(self.actions) {
            validate_name("action", &action)?;
            if actions.insert(action.clone(), handler).is_some() {
                return Err(ConfigurationError::DuplicateAction {
                    command: command.to_string(),
                    action,
                });
            }
        }

        for template in &self.templates {
            template.validate()?;
        }

        Ok(ComponentSet {
            templates: self.templates,
            actions,
            fallback: self.fallback,
        })
    }
}
