use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{handler_fn, Callable, HandlerResult};

/// One member of an API object, before classification.
#[derive(Clone)]
pub enum ApiValue {
    /// A callable operation.
    Function(Callable),
    /// A string-keyed mapping of further members.
    Object(IndexMap<String, ApiValue>),
    /// Plain serializable data.
    Data(Value),
}

impl ApiValue {
    pub fn is_function(&self) -> bool {
        matches!(self, ApiValue::Function(_))
    }

    pub fn as_function(&self) -> Option<&Callable> {
        match self {
            ApiValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            ApiValue::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ApiValue>> {
        match self {
            ApiValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Debug for ApiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiValue::Function(_) => f.write_str("Function"),
            ApiValue::Object(map) => f.debug_map().entries(map.iter()).finish(),
            ApiValue::Data(v) => write!(f, "Data({})", v),
        }
    }
}

/// Functions compare by identity, data and objects by content.
impl PartialEq for ApiValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ApiValue::Function(a), ApiValue::Function(b)) => Arc::ptr_eq(a, b),
            (ApiValue::Object(a), ApiValue::Object(b)) => a == b,
            (ApiValue::Data(a), ApiValue::Data(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for ApiValue {
    fn from(value: Value) -> Self {
        ApiValue::Data(value)
    }
}

impl From<Callable> for ApiValue {
    fn from(f: Callable) -> Self {
        ApiValue::Function(f)
    }
}

impl From<Namespace> for ApiValue {
    fn from(ns: Namespace) -> Self {
        ApiValue::Object(
            ns.methods
                .into_iter()
                .map(|(key, f)| (key, ApiValue::Function(f)))
                .collect(),
        )
    }
}

/// Builder for a group of methods sharing a channel prefix.
#[derive(Clone, Default, Debug)]
pub struct Namespace {
    methods: IndexMap<String, Callable>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method backed by an existing handler.
    pub fn handler(mut self, key: impl Into<String>, f: Callable) -> Self {
        self.methods.insert(key.into(), f);
        self
    }

    /// Add a method backed by an async closure.
    pub fn method<F, Fut>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler(key, handler_fn(f))
    }
}

/// The caller-owned API object the metadata is derived from.
///
/// Members keep insertion order, so derivation is reproducible for identical
/// construction sequences.
#[derive(Clone, Default, Debug)]
pub struct ApiObject {
    members: IndexMap<String, ApiValue>,
}

impl ApiObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. Re-inserting a key replaces the value in place.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<ApiValue>) -> Self {
        self.members.insert(key.into(), value.into());
        self
    }

    pub fn function<F, Fut>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.insert(key, ApiValue::Function(handler_fn(f)))
    }

    pub fn namespace(self, key: impl Into<String>, ns: Namespace) -> Self {
        self.insert(key, ns)
    }

    pub fn value(self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, ApiValue::Data(value))
    }

    pub fn get(&self, key: &str) -> Option<&ApiValue> {
        self.members.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiValue)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<(String, ApiValue)> for ApiObject {
    fn from_iter<I: IntoIterator<Item = (String, ApiValue)>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl From<IndexMap<String, ApiValue>> for ApiObject {
    fn from(members: IndexMap<String, ApiValue>) -> Self {
        Self { members }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_members_keep_insertion_order() {
        let api = ApiObject::new()
            .value("z", json!(1))
            .function("a", |p| async move { Ok(p) })
            .namespace("m", Namespace::new());

        let keys: Vec<&str> = api.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_namespace_debug_names_methods() {
        let ns = Namespace::new().method("m1", |p| async move { Ok(p) });
        assert_eq!(format!("{:?}", ns), r#"Namespace { methods: {"m1": Handler} }"#);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let api = ApiObject::new()
            .value("a", json!(1))
            .value("b", json!(2))
            .value("a", json!(3));

        let keys: Vec<&str> = api.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(api.get("a").and_then(ApiValue::as_data), Some(&json!(3)));
    }

    #[test]
    fn test_namespace_converts_to_object_of_functions() {
        let ns = Namespace::new()
            .method("m1", |p| async move { Ok(p) })
            .method("m2", |p| async move { Ok(p) });
        let value = ApiValue::from(ns);

        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.values().all(ApiValue::is_function));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = handler_fn(|p| async move { Ok(p) });
        let g = handler_fn(|p| async move { Ok(p) });
        assert_eq!(ApiValue::Function(f.clone()), ApiValue::Function(f));
        assert_ne!(
            ApiValue::Function(g),
            ApiValue::Function(handler_fn(|p| async move { Ok(p) }))
        );
        assert_eq!(ApiValue::from(json!([1, 2])), ApiValue::Data(json!([1, 2])));
    }

    #[test]
    fn test_debug_hides_function_internals() {
        let api = ApiObject::new()
            .function("f", |p| async move { Ok(p) })
            .value("n", json!(7));
        let rendered = format!("{:?}", api);
        assert!(rendered.contains("Function"));
        assert!(rendered.contains("Data(7)"));
    }
}
