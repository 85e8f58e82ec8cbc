//! Error types for the platform boundary.
//!
//! Framework-level errors (configuration, validation, decoding) are defined
//! in `tessera-framework`.

use thiserror::Error;

/// Errors a [`Responder`](crate::Responder) can report when delivering a reply.
#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    /// The transport is not connected to the platform.
    #[error("responder is not connected")]
    NotConnected,
    /// The platform did not acknowledge the request in time.
    #[error("reply timed out")]
    Timeout,
    /// The interaction was already acknowledged.
    #[error("interaction '{interaction_id}' was already acknowledged")]
    AlreadyAcknowledged {
        /// The interaction that was answered twice.
        interaction_id: String,
    },
    /// The platform rejected the request.
    #[error("platform rejected reply ({code}): {message}")]
    Rejected { code: i64, message: String },
    /// The payload could not be serialised.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ReplyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for responder calls.
pub type ReplyResult<T> = Result<T, ReplyError>;
