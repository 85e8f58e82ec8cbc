//! The outbound reply mechanism.
//!
//! A transport implements [`Responder`] to deliver replies to the platform.
//! The framework only decides what to send and whether it is ephemeral.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ReplyError, ReplyResult};
use crate::reply::Reply;

/// Sends responses for interactions.
///
/// Every method is keyed by the interaction id of the event being answered.
/// Component-only operations (`edit_message`, `delete_message`) act on the
/// message that carries the component.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Replies to the interaction.
    async fn reply(&self, interaction_id: &str, reply: Reply) -> ReplyResult<()>;

    /// Acknowledges the interaction without content.
    async fn defer(&self, interaction_id: &str, ephemeral: bool) -> ReplyResult<()>;

    /// Replaces the message that carries the component.
    async fn edit_message(&self, interaction_id: &str, _reply: Reply) -> ReplyResult<()> {
        Err(ReplyError::Other(format!(
            "edit_message is not supported (interaction '{interaction_id}')"
        )))
    }

    /// Deletes the message that carries the component.
    async fn delete_message(&self, interaction_id: &str) -> ReplyResult<()> {
        Err(ReplyError::Other(format!(
            "delete_message is not supported (interaction '{interaction_id}')"
        )))
    }
}

/// Shared, type-erased responder.
pub type BoxedResponder = Arc<dyn Responder>;

/// One call recorded by [`MemoryResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderCall {
    Reply { interaction_id: String, reply: Reply },
    Defer { interaction_id: String, ephemeral: bool },
    Edit { interaction_id: String, reply: Reply },
    Delete { interaction_id: String },
}

/// A responder that records every call in memory.
///
/// Useful for tests and for console demos where no platform is attached.
#[derive(Debug, Default)]
pub struct MemoryResponder {
    calls: Mutex<Vec<ResponderCall>>,
}

impl MemoryResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<ResponderCall> {
        self.calls.lock().clone()
    }

    /// Returns every reply payload, in order.
    pub fn replies(&self) -> Vec<Reply> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ResponderCall::Reply { reply, .. } => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `delete_message` calls.
    pub fn deletions(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ResponderCall::Delete { .. }))
            .count()
    }

    fn record(&self, call: ResponderCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Responder for MemoryResponder {
    async fn reply(&self, interaction_id: &str, reply: Reply) -> ReplyResult<()> {
        self.record(ResponderCall::Reply {
            interaction_id: interaction_id.to_string(),
            reply,
        });
        Ok(())
    }

    async fn defer(&self, interaction_id: &str, ephemeral: bool) -> ReplyResult<()> {
        self.record(ResponderCall::Defer {
            interaction_id: interaction_id.to_string(),
            ephemeral,
        });
        Ok(())
    }

    async fn edit_message(&self, interaction_id: &str, reply: Reply) -> ReplyResult<()> {
        self.record(ResponderCall::Edit {
            interaction_id: interaction_id.to_string(),
            reply,
        });
        Ok(())
    }

    async fn delete_message(&self, interaction_id: &str) -> ReplyResult<()> {
        self.record(ResponderCall::Delete {
            interaction_id: interaction_id.to_string(),
        });
        Ok(())
    }
}
