use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusion policy for top-level members that are not namespaces.
///
/// Fixed for the lifetime of an [`IpcApi`](crate::IpcApi).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    /// Expose top-level callables as channels named by their key alone.
    pub include_base_methods: bool,
    /// Top-level keys whose plain values are copied into the invoker.
    pub include_base_properties: IndexSet<String>,
}

/// Caller-supplied overrides. `None` keeps the default for that key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub include_base_methods: Option<bool>,
    pub include_base_properties: Option<Vec<String>>,
}

impl ApiConfig {
    /// Apply `overrides` over `self`, returning a new config.
    pub fn merged(&self, overrides: ConfigOverrides) -> Self {
        Self {
            include_base_methods: overrides
                .include_base_methods
                .unwrap_or(self.include_base_methods),
            include_base_properties: overrides
                .include_base_properties
                .map(|keys| keys.into_iter().collect())
                .unwrap_or_else(|| self.include_base_properties.clone()),
        }
    }

    /// Parse `{ "includeBaseMethods": .., "includeBaseProperties": [..] }`
    /// and merge it over the defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides = serde_json::from_str(s)?;
        Ok(Self::default().merged(overrides))
    }

    pub fn with_base_methods(mut self, include: bool) -> Self {
        self.include_base_methods = include;
        self
    }

    pub fn with_base_property(mut self, key: impl Into<String>) -> Self {
        self.include_base_properties.insert(key.into());
        self
    }

    pub fn includes_property(&self, key: &str) -> bool {
        self.include_base_properties.contains(key)
    }
}

impl From<ConfigOverrides> for ApiConfig {
    fn from(overrides: ConfigOverrides) -> Self {
        Self::default().merged(overrides)
    }
}
