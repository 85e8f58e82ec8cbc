//! Handler system for the Tessera framework.
//!
//! - **Handler** ([`traits`]) – the [`Handler`] trait, implemented for async
//!   functions whose parameters implement
//!   [`FromContext`](crate::extractor::FromContext), and its erased form
//!   [`BoxedHandler`]
//! - **Response** ([`response`]) – [`HandlerResponse`], which turns a
//!   handler's return value into a reply
//!
//! Slash handlers take [`InvocationContext`](crate::InvocationContext)
//! parameters; component handlers take
//! [`ComponentContext`](crate::ComponentContext) parameters. Both go through
//! the same trait.

pub mod response;
pub mod traits;

pub use response::HandlerResponse;
pub use traits::{BoxedHandler, Handler, into_handler};
