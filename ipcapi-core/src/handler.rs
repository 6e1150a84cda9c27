use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::RpcError;

/// Result of running a handler for one payload.
pub type HandlerResult = Result<Value, RpcError>;

/// A remotely callable operation: takes one payload, completes with a result.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, payload: Value) -> HandlerResult;
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Shared handle to a handler. Cloning shares the same operation.
pub type Callable = Arc<dyn Handler>;

/// Adapter turning an async closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, payload: Value) -> HandlerResult {
        (self.f)(payload).await
    }
}

/// Wrap an async closure as a [`Callable`].
///
/// ```ignore
/// let echo = handler_fn(|payload| async move { Ok(payload) });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Callable
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_fn_passes_payload() {
        let double = handler_fn(|payload: Value| async move {
            let n = payload.as_i64().ok_or_else(|| RpcError::bad_request("expected number"))?;
            Ok(json!(n * 2))
        });

        assert_eq!(double.call(json!(21)).await.unwrap(), json!(42));
        let err = double.call(json!("x")).await.unwrap_err();
        assert_eq!(err.message, "expected number");
    }

    #[test]
    fn test_debug_hides_closure() {
        let handler = FnHandler {
            f: |payload: Value| async move { Ok::<_, RpcError>(payload) },
        };
        assert_eq!(format!("{:?}", handler), "FnHandler { .. }");
        assert_eq!(format!("{:?}", handler_fn(|p| async move { Ok(p) })), "Handler");
    }

    #[tokio::test]
    async fn test_cloned_callable_shares_handler() {
        let echo = handler_fn(|payload| async move { Ok(payload) });
        let other = Arc::clone(&echo);
        assert!(Arc::ptr_eq(&echo, &other));
        assert_eq!(other.call(json!({"a": 1})).await.unwrap(), json!({"a": 1}));
    }
}
