use tracing::debug;

use crate::config::{ApiConfig, ConfigOverrides};
use crate::meta::{build_meta, MetaEntry};
use crate::value::ApiObject;

/// An API object together with its inclusion policy and derived metadata.
///
/// Metadata is computed once in the constructor and never changes; the
/// server and client facades read it as often as they like.
#[derive(Debug, Clone)]
pub struct IpcApi {
    api: ApiObject,
    config: ApiConfig,
    meta: Vec<MetaEntry>,
}

impl IpcApi {
    pub fn new(api: ApiObject, config: ApiConfig) -> Self {
        debug!(members = api.len(), ?config, "deriving IPC metadata");
        let meta = build_meta(&api, &config);
        Self { api, config, meta }
    }

    /// Construct with overrides merged over the default config.
    pub fn with_overrides(api: ApiObject, overrides: ConfigOverrides) -> Self {
        Self::new(api, ApiConfig::default().merged(overrides))
    }

    pub fn with_defaults(api: ApiObject) -> Self {
        Self::new(api, ApiConfig::default())
    }

    pub fn api(&self) -> &ApiObject {
        &self.api
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn meta(&self) -> &[MetaEntry] {
        &self.meta
    }

    /// Channel names of the metadata entries, in metadata order.
    pub fn channels(&self) -> Vec<String> {
        self.meta.iter().map(MetaEntry::channel).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Namespace;
    use serde_json::{json, Value};

    #[test]
    fn test_defaults_applied() {
        let api = IpcApi::with_defaults(ApiObject::new().value("a", json!(1)));
        assert_eq!(api.config(), &ApiConfig::default());
        assert!(api.meta().is_empty());
        assert_eq!(api.api().len(), 1);
    }

    #[test]
    fn test_overrides_merged_over_defaults() {
        let api = IpcApi::with_overrides(
            ApiObject::new().value("a", json!(1)),
            ConfigOverrides {
                include_base_properties: Some(vec!["a".into()]),
                ..Default::default()
            },
        );
        assert!(!api.config().include_base_methods);
        assert!(api.config().includes_property("a"));
        assert_eq!(api.channels(), vec!["a"]);
    }

    #[test]
    fn test_meta_is_stable_across_constructions() {
        let object = ApiObject::new()
            .function("f", |_| async { Ok(Value::Null) })
            .namespace("ns", Namespace::new().method("m1", |_| async { Ok(Value::Null) }));
        let config = ApiConfig::default().with_base_methods(true);

        let first = IpcApi::new(object.clone(), config.clone());
        let second = IpcApi::new(object, config);
        assert_eq!(first.meta(), second.meta());
        assert_eq!(first.channels(), vec!["f", "ns:m1"]);
    }
}
