//! The [`Handler`] trait and its type-erased form.
//!
//! Handlers are plain async functions or closures. Every parameter is
//! extracted from the request context through [`FromContext`], and the
//! return value is turned into a reply through [`HandlerResponse`]:
//!
//! ```rust,ignore
//! // No parameters
//! || async { }
//!
//! // The whole context
//! |ctx: Arc<InvocationContext>| async move {
//!     format!("hello {}", ctx.event().user.name)
//! }
//!
//! // Several extractors
//! async fn vote(Invoker(user): Invoker, Identity(id): Identity) -> Reply {
//!     Reply::text(format!("{} voted {}", user.name, id.action())).ephemeral(true)
//! }
//! ```
//!
//! All shapes are erased into one [`BoxedHandler<C>`] when registered. A
//! handler whose parameters cannot be extracted is not called; the
//! extraction error is returned instead.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::warn;

use crate::error::ExtractError;
use crate::extractor::FromContext;
use crate::handler::response::HandlerResponse;

/// An async handler over context type `C`.
///
/// Implemented for every `FnOnce` of up to eight [`FromContext<C>`]
/// parameters returning a future whose output implements
/// [`HandlerResponse<C>`]. `T` is the parameter tuple and only serves to keep
/// the implementations apart.
#[async_trait]
pub trait Handler<C, T>: Clone + Send + Sync + 'static {
    /// Calls the handler with the given context.
    ///
    /// Fails without calling it if a parameter cannot be extracted.
    async fn call(self, ctx: Arc<C>) -> Result<(), ExtractError>;
}

/// A type-erased handler that can be stored in a command definition.
pub type BoxedHandler<C> =
    Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<(), ExtractError>> + Send + Sync>;

/// Erases a handler.
pub fn into_handler<C, H, T>(handler: H) -> BoxedHandler<C>
where
    C: Send + Sync + 'static,
    H: Handler<C, T>,
    T: 'static,
{
    Arc::new(move |ctx| handler.clone().call(ctx))
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, C, $($ty,)*> Handler<C, ($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse<C> + 'static,
            C: Send + Sync + 'static,
            $( $ty: FromContext<C> + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<C>) -> Result<(), ExtractError> {
                $(
                    let $ty = match $ty::from_context(&ctx) {
                        Ok(value) => value,
                        Err(e) => {
                            warn!(error = %e, "Handler skipped: parameter extraction failed");
                            return Err(e);
                        }
                    };
                )*

                let res = (self)($($ty,)*).await;
                res.into_response(ctx).await;
                Ok(())
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ExtractResult;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Counter {
        fn bump(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Unavailable;

    impl FromContext<Counter> for Unavailable {
        fn from_context(_ctx: &Arc<Counter>) -> ExtractResult<Self> {
            Err(ExtractError::custom("not available"))
        }
    }

    #[test]
    fn test_handler_shapes_share_one_erased_type() {
        let ctx = Arc::new(Counter::default());
        let handlers: Vec<BoxedHandler<Counter>> = vec![
            into_handler(|| async {}),
            into_handler(|c: Arc<Counter>| async move { c.bump() }),
            into_handler(|c: Arc<Counter>, d: Arc<Counter>| async move {
                c.bump();
                d.bump();
            }),
        ];
        for handler in &handlers {
            assert!(tokio_test::block_on(handler(Arc::clone(&ctx))).is_ok());
        }
        assert_eq!(ctx.count(), 3);
    }

    #[test]
    fn test_failed_extraction_skips_handler() {
        let ctx = Arc::new(Counter::default());
        let handler: BoxedHandler<Counter> =
            into_handler(|c: Arc<Counter>, _u: Unavailable| async move { c.bump() });
        let result = tokio_test::block_on(handler(Arc::clone(&ctx)));
        assert!(matches!(result, Err(ExtractError::Custom(ref m)) if m == "not available"));
        assert_eq!(ctx.count(), 0);
    }

    #[test]
    fn test_optional_extractor_never_fails() {
        let ctx = Arc::new(Counter::default());
        let handler: BoxedHandler<Counter> =
            into_handler(|c: Arc<Counter>, u: Option<Unavailable>| async move {
                assert!(u.is_none());
                c.bump();
            });
        assert!(tokio_test::block_on(handler(Arc::clone(&ctx))).is_ok());
        assert_eq!(ctx.count(), 1);
    }
}
