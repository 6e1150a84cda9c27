/// Separator between namespace and key in a channel name.
pub const CHANNEL_SEPARATOR: char = ':';

/// Wire channel name for an entry: `key` for base entries,
/// `namespace:key` for namespaced ones.
///
/// Both facades derive names through this function only; the two sides of a
/// channel correlate by exact string equality.
pub fn channel_name(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        None => key.to_string(),
        Some(ns) => format!("{}{}{}", ns, CHANNEL_SEPARATOR, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_entry_uses_key() {
        assert_eq!(channel_name(None, "func"), "func");
    }

    #[test]
    fn test_namespaced_entry_joins_with_colon() {
        assert_eq!(channel_name(Some("ns1"), "method1"), "ns1:method1");
        assert_eq!(channel_name(Some(""), "m"), ":m");
    }
}
