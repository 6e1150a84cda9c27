// Metadata derivation
// One pass over the top-level members of an API object produces the ordered
// entry list both facades are driven from.

use tracing::debug;

use crate::channel::channel_name;
use crate::classify::{classify, Member};
use crate::config::ApiConfig;
use crate::value::{ApiObject, ApiValue};

/// One remotely visible member: `(namespace, key, value)`.
///
/// When `namespace` is set, `value` is always an [`ApiValue::Function`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEntry {
    pub namespace: Option<String>,
    pub key: String,
    pub value: ApiValue,
}

impl MetaEntry {
    /// Channel name both facades use for this entry.
    pub fn channel(&self) -> String {
        channel_name(self.namespace.as_deref(), &self.key)
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespace.is_some()
    }

    pub fn is_callable(&self) -> bool {
        self.value.is_function()
    }

    fn base(key: &str, value: &ApiValue) -> Self {
        Self {
            namespace: None,
            key: key.to_string(),
            value: value.clone(),
        }
    }
}

/// Derive the ordered metadata for `api` under `config`.
///
/// Members that match no rule are left out without error. A top-level
/// callable that is both admitted by `include_base_methods` and listed in
/// `include_base_properties` yields two identical entries.
pub fn build_meta(api: &ApiObject, config: &ApiConfig) -> Vec<MetaEntry> {
    let mut meta = Vec::new();

    for (key, value) in api.iter() {
        debug!("generating meta for {}", key);
        match classify(value) {
            Member::Namespace(methods) => {
                debug!("found namespace {} with {} methods", key, methods.len());
                meta.extend(methods.into_iter().map(|(sub_key, f)| MetaEntry {
                    namespace: Some(key.to_string()),
                    key: sub_key,
                    value: ApiValue::Function(f),
                }));
            }
            Member::BaseProperty(_) => {
                if config.includes_property(key) {
                    debug!("found included base property {}", key);
                    meta.push(MetaEntry::base(key, value));
                }
            }
            Member::Callable(_) => {
                if config.include_base_methods {
                    debug!("found included base method {}", key);
                    meta.push(MetaEntry::base(key, value));
                }
                if config.includes_property(key) {
                    debug!("found callable {} listed as base property", key);
                    meta.push(MetaEntry::base(key, value));
                }
            }
        }
    }

    debug!("generated {} meta entries", meta.len());
    meta
}
