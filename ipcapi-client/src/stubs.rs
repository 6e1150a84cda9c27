use async_trait::async_trait;
use futures::future::BoxFuture;
use ipcapi_core::{Handler, HandlerResult};
use ipcapi_transport::Invoke;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Client-side stand-in for one remote operation.
///
/// Calling it sends the payload to the invocation collaborator under the
/// stub's channel name and hands back that call's result untouched: no
/// retries, no timeout, no transformation.
#[derive(Clone)]
pub struct ForwardingStub {
    channel: String,
    invoker: Arc<dyn Invoke>,
}

impl ForwardingStub {
    pub fn new(channel: impl Into<String>, invoker: Arc<dyn Invoke>) -> Self {
        Self {
            channel: channel.into(),
            invoker,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Forward `props` and return the pending result.
    ///
    /// The returned future owns everything it needs, so it can be spawned or
    /// held independently of the stub.
    pub fn call(&self, props: Value) -> BoxFuture<'static, HandlerResult> {
        let channel = self.channel.clone();
        let invoker = Arc::clone(&self.invoker);
        Box::pin(async move {
            trace!(%channel, "forwarding call");
            invoker.invoke(&channel, props).await
        })
    }
}

impl fmt::Debug for ForwardingStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardingStub")
            .field("channel", &self.channel)
            .finish()
    }
}

#[async_trait]
impl Handler for ForwardingStub {
    async fn call(&self, payload: Value) -> HandlerResult {
        ForwardingStub::call(self, payload).await
    }
}
