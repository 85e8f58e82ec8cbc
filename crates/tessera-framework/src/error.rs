//! Error types for the Tessera framework.
//!
//! Only [`ConfigurationError`] is ever fatal, and only at startup. Every
//! other error aborts a single dispatch and is reported to the invoking user.

use thiserror::Error;

use tessera_core::UserId;

/// A command definition is invalid. Raised while commands are built or
/// registered, never while events are dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Two commands share a name.
    #[error("duplicate command '{0}'")]
    DuplicateCommand(String),

    /// Two options of one command share a name.
    #[error("command '{command}': duplicate option '{option}'")]
    DuplicateOption { command: String, option: String },

    /// Two checks of one command share a name.
    #[error("command '{command}': duplicate check '{check}'")]
    DuplicateCheck { command: String, check: String },

    /// Two component handlers are bound to the same action.
    #[error("command '{command}': action '{action}' is bound twice")]
    DuplicateAction { command: String, action: String },

    /// A command, option or action name breaks the naming rules.
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    /// A required option was declared after an optional one.
    #[error("command '{command}': required option '{option}' follows an optional one")]
    RequiredAfterOptional { command: String, option: String },

    /// Choices or a range do not fit the option's type.
    #[error("command '{command}': option '{option}' {reason}")]
    InvalidOptionConstraint {
        command: String,
        option: String,
        reason: &'static str,
    },

    /// The command was built without a slash handler.
    #[error("command '{0}' has no handler")]
    MissingHandler(String),

    /// A component identity would not fit in the platform's length budget.
    #[error("component id for '{command}:{action}' needs {length} characters, limit is {limit}")]
    ComponentIdTooLong {
        command: String,
        action: String,
        length: usize,
        limit: usize,
    },
}

/// Why an opaque component identifier could not be turned into an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The string was not produced by this framework, or was corrupted.
    #[error("malformed component id")]
    Malformed,
    /// The identifier is well formed but names a command that is not registered.
    #[error("component id refers to an unknown command")]
    UnknownCommand,
    /// The string is longer than any identifier this framework produces.
    #[error("component id exceeds the length limit")]
    LengthExceeded,
}

/// A supplied option value failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required option '{option}'")]
    Missing { option: String },

    #[error("option '{option}' must be {expected}")]
    InvalidType {
        option: String,
        expected: &'static str,
    },

    #[error("option '{option}' is not one of the allowed choices")]
    NotAChoice { option: String },

    #[error("option '{option}' is out of range")]
    OutOfRange { option: String },

    #[error("option '{option}' was rejected: {reason}")]
    Rejected { option: String, reason: String },

    #[error("unknown option '{option}'")]
    Unknown { option: String },
}

impl ValidationError {
    /// The name of the offending option.
    pub fn option(&self) -> &str {
        match self {
            Self::Missing { option }
            | Self::InvalidType { option, .. }
            | Self::NotAChoice { option }
            | Self::OutOfRange { option }
            | Self::Rejected { option, .. }
            | Self::Unknown { option } => option,
        }
    }
}

/// A restricted component was used by someone other than its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("component restricted to user {owner} was used by {actor}")]
pub struct AuthorizationError {
    pub owner: UserId,
    pub actor: UserId,
}

/// A named check rejected the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("check failed: {name}")]
pub struct CheckFailure {
    pub name: String,
    pub reason: Option<String>,
}

/// The command name did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command '{0}' not found")]
pub struct NotFound(pub String);

/// Errors that can occur during handler parameter extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// An option was requested with a type it was not declared with.
    #[error("option '{option}' is not a {expected}")]
    OptionType {
        option: String,
        expected: &'static str,
    },

    /// An option was requested that the invocation did not carry.
    #[error("option '{0}' was not supplied")]
    OptionMissing(String),

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
