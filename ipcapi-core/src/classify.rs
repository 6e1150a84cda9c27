use indexmap::IndexMap;
use serde_json::Value;

use crate::handler::Callable;
use crate::value::ApiValue;

/// Classification of a single API object member.
#[derive(Clone, Debug)]
pub enum Member {
    Callable(Callable),
    /// A mapping whose members are all callable. May be empty.
    Namespace(IndexMap<String, Callable>),
    BaseProperty(ApiValue),
}

/// Sort a member into exactly one of the three buckets.
///
/// A mapping with no members is an empty namespace, not a base property.
/// That holds for JSON objects too: `{}` is an empty namespace while any
/// non-empty JSON object is plain data, since JSON cannot hold callables.
pub fn classify(value: &ApiValue) -> Member {
    match value {
        ApiValue::Function(f) => Member::Callable(f.clone()),
        ApiValue::Object(map) => {
            let methods: Option<IndexMap<String, Callable>> = map
                .iter()
                .map(|(key, member)| member.as_function().map(|f| (key.clone(), f.clone())))
                .collect();
            match methods {
                Some(methods) => Member::Namespace(methods),
                None => Member::BaseProperty(value.clone()),
            }
        }
        ApiValue::Data(Value::Object(map)) if map.is_empty() => Member::Namespace(IndexMap::new()),
        ApiValue::Data(_) => Member::BaseProperty(value.clone()),
    }
}
