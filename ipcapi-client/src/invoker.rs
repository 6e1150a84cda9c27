// Invoker construction
// Mirrors the shape of an API object on the calling side: namespaces become
// groups of forwarding stubs, included base methods become top-level stubs
// and included base properties are copied by value.

use futures::future::BoxFuture;
use indexmap::IndexMap;
use ipcapi_core::{ApiValue, HandlerResult, IpcApi, RpcError};
use ipcapi_transport::Invoke;
use serde_json::Value;
use std::future;
use std::sync::Arc;
use tracing::debug;

use crate::stubs::ForwardingStub;

/// One top-level member of an [`Invoker`].
#[derive(Debug, Clone)]
pub enum InvokerMember {
    Namespace(IndexMap<String, ForwardingStub>),
    Method(ForwardingStub),
    /// Copy of a base property taken when the invoker was built.
    Property(ApiValue),
}

impl InvokerMember {
    /// Stubs held by this member: all of a namespace, one for a method,
    /// none for a property.
    pub fn stubs(&self) -> Box<dyn Iterator<Item = &ForwardingStub> + '_> {
        match self {
            InvokerMember::Namespace(stubs) => Box::new(stubs.values()),
            InvokerMember::Method(stub) => Box::new(std::iter::once(stub)),
            InvokerMember::Property(_) => Box::new(std::iter::empty()),
        }
    }
}

/// Client-side mirror of an API object.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    members: IndexMap<String, InvokerMember>,
}

impl Invoker {
    pub fn get(&self, key: &str) -> Option<&InvokerMember> {
        self.members.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn namespace(&self, namespace: &str) -> Option<&IndexMap<String, ForwardingStub>> {
        match self.members.get(namespace)? {
            InvokerMember::Namespace(stubs) => Some(stubs),
            _ => None,
        }
    }

    /// Stub for `namespace.key`.
    pub fn method(&self, namespace: &str, key: &str) -> Option<&ForwardingStub> {
        self.namespace(namespace)?.get(key)
    }

    /// Stub for a top-level base method.
    pub fn base_method(&self, key: &str) -> Option<&ForwardingStub> {
        match self.members.get(key)? {
            InvokerMember::Method(stub) => Some(stub),
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&ApiValue> {
        match self.members.get(key)? {
            InvokerMember::Property(value) => Some(value),
            _ => None,
        }
    }

    /// Every stub in the invoker, namespaced ones in namespace order.
    pub fn stubs(&self) -> impl Iterator<Item = &ForwardingStub> {
        self.members.values().flat_map(InvokerMember::stubs)
    }

    /// Call `namespace.key`, or the base method `key` when `namespace` is `None`.
    ///
    /// A member the invoker does not have fails with `not_found` without
    /// touching the transport.
    pub fn call(
        &self,
        namespace: Option<&str>,
        key: &str,
        props: Value,
    ) -> BoxFuture<'static, HandlerResult> {
        let stub = match namespace {
            Some(ns) => self.method(ns, key),
            None => self.base_method(key),
        };
        match stub {
            Some(stub) => stub.call(props),
            None => {
                let name = ipcapi_core::channel_name(namespace, key);
                Box::pin(future::ready(Err(RpcError::not_found(format!(
                    "invoker has no method '{}'",
                    name
                )))))
            }
        }
    }
}

/// Build the invoker for `api`, forwarding every stub through `invoker`.
///
/// Read-only over the metadata; may be called any number of times.
pub fn build_invoker(api: &IpcApi, invoker: Arc<dyn Invoke>) -> Invoker {
    let config = api.config();
    let mut members: IndexMap<String, InvokerMember> = IndexMap::new();

    for entry in api.meta() {
        match &entry.namespace {
            Some(namespace) => {
                let member = members
                    .entry(namespace.clone())
                    .or_insert_with(|| InvokerMember::Namespace(IndexMap::new()));
                if let InvokerMember::Namespace(stubs) = member {
                    debug!(channel = %entry.channel(), "adding namespaced stub");
                    stubs.insert(
                        entry.key.clone(),
                        ForwardingStub::new(entry.channel(), Arc::clone(&invoker)),
                    );
                }
            }
            None if entry.is_callable() => {
                if config.include_base_methods {
                    debug!(key = %entry.key, "adding base method stub");
                    members.insert(
                        entry.key.clone(),
                        InvokerMember::Method(ForwardingStub::new(
                            entry.channel(),
                            Arc::clone(&invoker),
                        )),
                    );
                }
            }
            None => {
                if config.includes_property(&entry.key) {
                    debug!(key = %entry.key, "copying base property");
                    members.insert(
                        entry.key.clone(),
                        InvokerMember::Property(entry.value.clone()),
                    );
                }
            }
        }
    }

    Invoker { members }
}
