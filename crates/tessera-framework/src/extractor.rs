//! Handler parameter extraction.
//!
//! Any type implementing [`FromContext<C>`] can appear as a parameter of a
//! handler over context `C`. If extraction fails, the handler is skipped and
//! the failure is logged.
//!
//! | extractor | slash | component |
//! |-----------|-------|-----------|
//! | `Arc<C>` (the context itself) | ✓ | ✓ |
//! | [`Invoker`] | ✓ | ✓ |
//! | [`Options`] | ✓ | |
//! | [`Identity`] | | ✓ |
//! | [`SelectedValues`] | | ✓ |
//! | `Option<T>` | never fails | never fails |

use std::sync::Arc;

use tessera_core::User;

use crate::command::options::ResolvedOptions;
use crate::component_id::ComponentIdentity;
use crate::context::{ComponentContext, InteractionContext, InvocationContext};
use crate::error::ExtractResult;

/// A value that can be extracted from context `C`.
pub trait FromContext<C>: Sized {
    fn from_context(ctx: &Arc<C>) -> ExtractResult<Self>;
}

impl<C> FromContext<C> for Arc<C> {
    fn from_context(ctx: &Arc<C>) -> ExtractResult<Self> {
        Ok(Arc::clone(ctx))
    }
}

impl<C, T: FromContext<C>> FromContext<C> for Option<T> {
    fn from_context(ctx: &Arc<C>) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

/// The user who triggered the interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker(pub User);

impl<C: InteractionContext> FromContext<C> for Invoker {
    fn from_context(ctx: &Arc<C>) -> ExtractResult<Self> {
        Ok(Self(ctx.user().clone()))
    }
}

/// All validated options of a slash invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Options(pub ResolvedOptions);

impl FromContext<InvocationContext> for Options {
    fn from_context(ctx: &Arc<InvocationContext>) -> ExtractResult<Self> {
        Ok(Self(ctx.options().clone()))
    }
}

/// The decoded identity of the used component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub ComponentIdentity);

impl FromContext<ComponentContext> for Identity {
    fn from_context(ctx: &Arc<ComponentContext>) -> ExtractResult<Self> {
        Ok(Self(ctx.identity().clone()))
    }
}

/// Values chosen in a select menu; empty for buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedValues(pub Vec<String>);

impl FromContext<ComponentContext> for SelectedValues {
    fn from_context(ctx: &Arc<ComponentContext>) -> ExtractResult<Self> {
        Ok(Self(ctx.selected_values().to_vec()))
    }
}
