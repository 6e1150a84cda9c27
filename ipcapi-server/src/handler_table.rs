use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ipcapi_core::{Callable, HandlerResult, RpcError};
use ipcapi_transport::{HandlerRegistry, Invoke, RegistryError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What a [`HandlerTable`] does when a channel is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later handler replaces the earlier one.
    #[default]
    Replace,
    /// The later registration fails with [`RegistryError::DuplicateChannel`].
    Reject,
}

/// In-process registry mapping channel names to handlers.
///
/// Implements [`HandlerRegistry`] for the registration facade and [`Invoke`]
/// for dispatch, so it can sit behind
/// [`serve_connection`](ipcapi_transport::serve_connection) or be handed
/// straight to an invoker in tests.
pub struct HandlerTable {
    handlers: DashMap<String, Callable>,
    policy: DuplicatePolicy,
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("channels", &self.channels())
            .field("policy", &self.policy)
            .finish()
    }
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        HandlerTable {
            handlers: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn lookup(&self, channel: &str) -> Option<Callable> {
        self.handlers.get(channel).map(|entry| Arc::clone(&*entry))
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    pub fn remove(&self, channel: &str) -> Option<Callable> {
        self.handlers.remove(channel).map(|(_, v)| v)
    }

    /// Registered channel names, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        channels.sort();
        channels
    }

    pub fn clear(&self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered under `channel`.
    pub async fn dispatch(&self, channel: &str, payload: Value) -> HandlerResult {
        let handler = self.lookup(channel).ok_or_else(|| {
            warn!(channel, "no handler registered");
            RpcError::not_found(format!("no handler registered for channel '{}'", channel))
        })?;
        trace!(channel, "dispatching");
        handler.call(payload).await
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry for HandlerTable {
    fn register_handler(&self, channel: &str, handler: Callable) -> Result<(), RegistryError> {
        match self.handlers.entry(channel.to_string()) {
            Entry::Occupied(mut entry) => match self.policy {
                DuplicatePolicy::Replace => {
                    debug!(channel, "replacing existing handler");
                    entry.insert(handler);
                    Ok(())
                }
                DuplicatePolicy::Reject => {
                    Err(RegistryError::DuplicateChannel(channel.to_string()))
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(handler);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Invoke for HandlerTable {
    async fn invoke(&self, channel: &str, payload: Value) -> HandlerResult {
        self.dispatch(channel, payload).await
    }
}
