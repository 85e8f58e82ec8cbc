//! Turning handler return values into replies.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use tessera_core::{Embed, Reply};

use crate::context::InteractionContext;

/// A value a handler may return.
#[async_trait]
pub trait HandlerResponse<C>: Send {
    async fn into_response(self, ctx: Arc<C>);
}

/// `()` sends nothing.
#[async_trait]
impl<C: Send + Sync + 'static> HandlerResponse<C> for () {
    async fn into_response(self, _ctx: Arc<C>) {}
}

async fn send<C: InteractionContext>(ctx: &C, reply: Reply) {
    if let Err(e) = ctx.reply(reply).await {
        error!(
            command = %ctx.command_name(),
            interaction_id = %ctx.interaction_id(),
            error = %e,
            "Failed to send reply"
        );
    }
}

/// A `String` is sent as a plain-text reply.
#[async_trait]
impl<C: InteractionContext + 'static> HandlerResponse<C> for String {
    async fn into_response(self, ctx: Arc<C>) {
        send(&*ctx, Reply::text(self)).await;
    }
}

#[async_trait]
impl<C: InteractionContext + 'static> HandlerResponse<C> for Reply {
    async fn into_response(self, ctx: Arc<C>) {
        send(&*ctx, self).await;
    }
}

#[async_trait]
impl<C: InteractionContext + 'static> HandlerResponse<C> for Embed {
    async fn into_response(self, ctx: Arc<C>) {
        send(&*ctx, Reply::embed(self)).await;
    }
}

/// `Some` is handled like the inner value; `None` sends nothing.
#[async_trait]
impl<C, T> HandlerResponse<C> for Option<T>
where
    C: Send + Sync + 'static,
    T: HandlerResponse<C>,
{
    async fn into_response(self, ctx: Arc<C>) {
        if let Some(t) = self {
            t.into_response(ctx).await;
        }
    }
}

/// `Ok` is handled like the inner value; `Err` is logged.
#[async_trait]
impl<C, T, E> HandlerResponse<C> for Result<T, E>
where
    C: Send + Sync + 'static,
    T: HandlerResponse<C>,
    E: std::fmt::Display + Send,
{
    async fn into_response(self, ctx: Arc<C>) {
        match self {
            Ok(t) => t.into_response(ctx).await,
            Err(e) => {
                error!("Handler error: {e}");
            }
        }
    }
}
