use async_trait::async_trait;
use ipcapi_core::{Callable, HandlerResult};
use serde_json::Value;
use thiserror::Error;

use crate::codec::CodecError;

/// Why [`serve_connection`](crate::serve_connection) stopped early.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failure reported by a registration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a handler is already registered for channel '{0}'")]
    DuplicateChannel(String),
    #[error("registration rejected for channel '{channel}': {reason}")]
    Rejected { channel: String, reason: String },
}

/// Registration side of a channel transport: binds a handler to a channel name.
///
/// What happens on a second registration under the same name is up to the
/// implementation; it may replace, ignore or reject.
pub trait HandlerRegistry: Send + Sync {
    fn register_handler(&self, channel: &str, handler: Callable) -> Result<(), RegistryError>;
}

/// Invocation side of a channel transport: sends a payload to whatever
/// handler the cooperating side registered under `channel`.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, channel: &str, payload: Value) -> HandlerResult;
}

#[async_trait]
impl<T: Invoke + ?Sized> Invoke for std::sync::Arc<T> {
    async fn invoke(&self, channel: &str, payload: Value) -> HandlerResult {
        (**self).invoke(channel, payload).await
    }
}

impl<T: HandlerRegistry + ?Sized> HandlerRegistry for std::sync::Arc<T> {
    fn register_handler(&self, channel: &str, handler: Callable) -> Result<(), RegistryError> {
        (**self).register_handler(channel, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipcapi_core::{handler_fn, RpcError};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recording {
        channels: Mutex<Vec<String>>,
    }

    impl HandlerRegistry for Recording {
        fn register_handler(&self, channel: &str, _handler: Callable) -> Result<(), RegistryError> {
            self.channels.lock().unwrap().push(channel.to_string());
            Ok(())
        }
    }

    struct Refusing;

    #[async_trait]
    impl Invoke for Refusing {
        async fn invoke(&self, channel: &str, _payload: Value) -> HandlerResult {
            Err(RpcError::not_found(channel))
        }
    }

    #[test]
    fn test_registry_through_arc() {
        let registry = Arc::new(Recording::default());
        let shared: Arc<dyn HandlerRegistry> = registry.clone();
        shared
            .register_handler("ns:m1", handler_fn(|p| async move { Ok(p) }))
            .unwrap();
        assert_eq!(*registry.channels.lock().unwrap(), vec!["ns:m1".to_string()]);
    }

    #[tokio::test]
    async fn test_invoke_through_arc() {
        let invoker: Arc<dyn Invoke> = Arc::new(Refusing);
        let err = invoker.invoke("ns:m1", Value::Null).await.unwrap_err();
        assert_eq!(err, RpcError::not_found("ns:m1"));
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateChannel("ns:m1".into());
        assert_eq!(
            err.to_string(),
            "a handler is already registered for channel 'ns:m1'"
        );
    }
}
