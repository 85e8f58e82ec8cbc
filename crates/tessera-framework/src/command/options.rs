//! Option schema and its validation.
//!
//! An [`OptionsScope`] collects the ordered option schema of one command.
//! At dispatch time [`resolve`] checks the raw platform values against that
//! schema and produces typed [`ResolvedOptions`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use tessera_core::{ChannelId, RawOption, RoleId, UserId};

use crate::error::{ConfigurationError, ExtractError, ExtractResult, ValidationError};

/// The declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
}

impl OptionType {
    /// Human-readable description used in validation messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::User => "a user",
            Self::Channel => "a channel",
            Self::Role => "a role",
            Self::Mentionable => "a user or role",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }

    fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }

    /// Converts a raw platform value into a typed one.
    fn parse(self, value: &Value) -> Option<OptionValue> {
        Some(match self {
            Self::String => OptionValue::String(value.as_str()?.to_string()),
            Self::Integer => OptionValue::Integer(value.as_i64()?),
            Self::Number => OptionValue::Number(value.as_f64()?),
            Self::Boolean => OptionValue::Boolean(value.as_bool()?),
            Self::User => OptionValue::User(UserId(snowflake(value)?)),
            Self::Channel => OptionValue::Channel(ChannelId(snowflake(value)?)),
            Self::Role => OptionValue::Role(RoleId(snowflake(value)?)),
            Self::Mentionable => OptionValue::Mentionable(snowflake(value)?),
        })
    }
}

/// Platforms send snowflakes as strings; numbers are accepted too.
fn snowflake(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// A validated option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(UserId),
    Channel(ChannelId),
    Role(RoleId),
    /// A user or role id.
    Mentionable(u64),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn kind(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::Boolean(_) => OptionType::Boolean,
            Self::User(_) => OptionType::User,
            Self::Channel(_) => OptionType::Channel,
            Self::Role(_) => OptionType::Role,
            Self::Mentionable(_) => OptionType::Mentionable,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::from(s.as_str()),
            Self::Integer(i) => Value::from(*i),
            Self::Number(n) => Value::from(*n),
            Self::Boolean(b) => Value::from(*b),
            Self::User(id) => Value::from(id.to_string()),
            Self::Channel(id) => Value::from(id.to_string()),
            Self::Role(id) => Value::from(id.to_string()),
            Self::Mentionable(id) => Value::from(id.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::User(id) => write!(f, "{id}"),
            Self::Channel(id) => write!(f, "{id}"),
            Self::Role(id) => write!(f, "{id}"),
            Self::Mentionable(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Types a handler can read an option as.
pub trait FromOptionValue: Sized {
    /// Describes the expected type in extraction errors.
    const EXPECTED: &'static str;

    fn from_option_value(value: &OptionValue) -> Option<Self>;
}

macro_rules! impl_from_option_value {
    ($ty:ty, $expected:literal, |$v:ident| $body:expr) => {
        impl FromOptionValue for $ty {
            const EXPECTED: &'static str = $expected;

            fn from_option_value($v: &OptionValue) -> Option<Self> {
                $body
            }
        }
    };
}

impl_from_option_value!(String, "string", |v| v.as_str().map(str::to_string));
impl_from_option_value!(i64, "integer", |v| v.as_i64());
impl_from_option_value!(f64, "number", |v| v.as_f64());
impl_from_option_value!(bool, "boolean", |v| v.as_bool());
impl_from_option_value!(UserId, "user", |v| match v {
    OptionValue::User(id) => Some(*id),
    _ => None,
});
impl_from_option_value!(ChannelId, "channel", |v| match v {
    OptionValue::Channel(id) => Some(*id),
    _ => None,
});
impl_from_option_value!(RoleId, "role", |v| match v {
    OptionValue::Role(id) => Some(*id),
    _ => None,
});
impl_from_option_value!(OptionValue, "option value", |v| Some(v.clone()));

/// Custom validator attached to an option.
pub type Validator = Arc<dyn Fn(&OptionValue) -> Result<(), String> + Send + Sync>;

/// A fixed choice offered to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChoice {
    pub name: String,
    pub value: OptionValue,
}

/// One entry of a command's option schema.
#[derive(Clone)]
pub struct OptionSpec {
    name: String,
    description: String,
    kind: OptionType,
    required: bool,
    choices: Vec<OptionChoice>,
    min: Option<f64>,
    max: Option<f64>,
    validator: Option<Validator>,
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("choices", &self.choices)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl OptionSpec {
    fn new(name: String, description: String, kind: OptionType, required: bool) -> Self {
        Self {
            name,
            description,
            kind,
            required,
            choices: Vec::new(),
            min: None,
            max: None,
            validator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> OptionType {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn choices_list(&self) -> &[OptionChoice] {
        &self.choices
    }

    /// Attaches a validator. `Err(reason)` rejects the value.
    pub fn validate<F>(&mut self, validator: F) -> &mut Self
    where
        F: Fn(&OptionValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Adds one fixed choice.
    pub fn choice(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds several fixed choices.
    pub fn choices<N, V>(&mut self, choices: impl IntoIterator<Item = (N, V)>) -> &mut Self
    where
        N: Into<String>,
        V: Into<OptionValue>,
    {
        for (name, value) in choices {
            self.choice(name, value);
        }
        self
    }

    /// Restricts a numeric option to `min..=max`.
    pub fn range(&mut self, min: f64, max: f64) -> &mut Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(&mut self, min: f64) -> &mut Self {
        self.min = Some(min);
        self
    }

    pub fn max(&mut self, max: f64) -> &mut Self {
        self.max = Some(max);
        self
    }

    /// Checks that choices and range make sense for the declared type.
    pub(crate) fn check_constraints(&self, command: &str) -> Result<(), ConfigurationError> {
        let fail = |reason| ConfigurationError::InvalidOptionConstraint {
            command: command.to_string(),
            option: self.name.clone(),
            reason,
        };

        if !self.choices.is_empty() {
            if !self.kind.supports_choices() {
                return Err(fail("cannot have choices"));
            }
            let mismatched = self.choices.iter().any(|c| {
                let kind = c.value.kind();
                kind != self.kind && !(self.kind == OptionType::Number && kind == OptionType::Integer)
            });
            if mismatched {
                return Err(fail("has a choice of the wrong type"));
            }
        }

        if self.min.is_some() || self.max.is_some() {
            if !self.kind.is_numeric() {
                return Err(fail("cannot have a range"));
            }
            if let (Some(min), Some(max)) = (self.min, self.max)
                && min > max
            {
                return Err(fail("has an empty range"));
            }
        }
        Ok(())
    }

    /// Validates one supplied raw value.
    fn check_value(&self, raw: &Value) -> Result<OptionValue, ValidationError> {
        let value = self
            .kind
            .parse(raw)
            .ok_or_else(|| ValidationError::InvalidType {
                option: self.name.clone(),
                expected: self.kind.describe(),
            })?;

        if !self.choices.is_empty() && !self.choices.iter().any(|c| choice_matches(&c.value, &value)) {
            return Err(ValidationError::NotAChoice {
                option: self.name.clone(),
            });
        }

        if let Some(n) = value.as_f64() {
            let below = self.min.is_some_and(|min| n < min);
            let above = self.max.is_some_and(|max| n > max);
            if below || above {
                return Err(ValidationError::OutOfRange {
                    option: self.name.clone(),
                });
            }
        }

        if let Some(validator) = &self.validator {
            validator(&value).map_err(|reason| ValidationError::Rejected {
                option: self.name.clone(),
                reason,
            })?;
        }
        Ok(value)
    }

    pub fn manifest(&self) -> OptionManifest {
        OptionManifest {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            required: self.required,
            choices: self
                .choices
                .iter()
                .map(|c| ChoiceManifest {
                    name: c.name.clone(),
                    value: c.value.to_json(),
                })
                .collect(),
            min_value: self.min,
            max_value: self.max,
        }
    }
}

fn choice_matches(choice: &OptionValue, value: &OptionValue) -> bool {
    match (choice, value) {
        (OptionValue::Integer(_), OptionValue::Number(_)) => choice.as_f64() == value.as_f64(),
        _ => choice == value,
    }
}

/// Serialisable description of one option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionManifest {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

/// Serialisable description of one choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceManifest {
    pub name: String,
    pub value: Value,
}

/// Collects the option schema of one command.
///
/// ```rust,ignore
/// SlashCommand::new("roll", "Roll dice").options(|o| {
///     o.required_integer("sides", "Number of sides").range(2.0, 100.0);
///     o.optional_string("label", "What the roll is for");
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionsScope {
    entries: Vec<OptionSpec>,
}

macro_rules! option_methods {
    ($($required:ident, $optional:ident => $kind:ident;)*) => {
        $(
            pub fn $required(
                &mut self,
                name: impl Into<String>,
                description: impl Into<String>,
            ) -> &mut OptionSpec {
                self.push(name.into(), description.into(), OptionType::$kind, true)
            }

            pub fn $optional(
                &mut self,
                name: impl Into<String>,
                description: impl Into<String>,
            ) -> &mut OptionSpec {
                self.push(name.into(), description.into(), OptionType::$kind, false)
            }
        )*
    };
}

impl OptionsScope {
    option_methods! {
        required_string, optional_string => String;
        required_integer, optional_integer => Integer;
        required_number, optional_number => Number;
        required_boolean, optional_boolean => Boolean;
        required_user, optional_user => User;
        required_channel, optional_channel => Channel;
        required_role, optional_role => Role;
        required_mentionable, optional_mentionable => Mentionable;
    }

    fn push(
        &mut self,
        name: String,
        description: String,
        kind: OptionType,
        required: bool,
    ) -> &mut OptionSpec {
        let index = self.entries.len();
        self.entries
            .push(OptionSpec::new(name, description, kind, required));
        &mut self.entries[index]
    }

    pub(crate) fn into_entries(self) -> Vec<OptionSpec> {
        self.entries
    }
}

/// Option values that passed validation, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Reads an option as `T`. `Ok(None)` if it was not supplied.
    pub fn get_as<T: FromOptionValue>(&self, name: &str) -> ExtractResult<Option<T>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => T::from_option_value(value)
                .map(Some)
                .ok_or_else(|| ExtractError::OptionType {
                    option: name.to_string(),
                    expected: T::EXPECTED,
                }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Validates raw option values against a schema.
///
/// Declared options are checked in schema order; undeclared options are
/// reported after every declared one passed. JSON `null` counts as absent.
pub fn resolve(schema: &[OptionSpec], raw: &[RawOption]) -> Result<ResolvedOptions, ValidationError> {
    let mut values = BTreeMap::new();

    for spec in schema {
        let supplied = raw
            .iter()
            .find(|o| o.name == spec.name)
            .filter(|o| !o.value.is_null());
        match supplied {
            Some(option) => {
                values.insert(spec.name.clone(), spec.check_value(&option.value)?);
            }
            None if spec.required => {
                return Err(ValidationError::Missing {
                    option: spec.name.clone(),
                });
            }
            None => {}
        }
    }

    if let Some(unknown) = raw.iter().find(|o| !schema.iter().any(|s| s.name == o.name)) {
        return Err(ValidationError::Unknown {
            option: unknown.name.clone(),
        });
    }

    Ok(ResolvedOptions { values })
}
