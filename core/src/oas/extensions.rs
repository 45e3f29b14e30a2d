//! # Vendor Extensions
//!
//! Reads `x-*` extensions out of design metadata and merges them into emitted objects.
//! Every target object merges independently; nothing is inherited across levels.

use crate::design::Meta;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Vendor extensions keyed by their `x-` name.
pub type Extensions = BTreeMap<String, Value>;

/// Metadata key prefixes that declare an extension.
const EXTENSION_PREFIXES: [&str; 2] = ["swagger:extension:", "openapi:extension:"];

/// Extracts the vendor extensions declared in `meta`.
///
/// Values that parse as JSON are emitted as JSON, anything else as a plain string.
/// Keys not starting with `x-` are not legal extensions and are dropped.
pub fn extensions_from_meta(meta: &Meta) -> Extensions {
    let mut extensions = Extensions::new();
    for (key, raw) in meta {
        let Some(name) = EXTENSION_PREFIXES
            .iter()
            .find_map(|prefix| key.strip_prefix(prefix))
        else {
            continue;
        };
        if !name.starts_with("x-") {
            warn!(key = %key, "ignoring extension that does not start with 'x-'");
            continue;
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        extensions.insert(name.to_string(), value);
    }
    extensions
}

/// Merges `design` into `target`; on key conflicts the design value wins.
pub fn merge(mut target: Extensions, design: &Extensions) -> Extensions {
    for (key, value) in design {
        target.insert(key.clone(), value.clone());
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(entries: &[(&str, &str)]) -> Meta {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extracts_json_and_string_values() {
        let ext = extensions_from_meta(&meta(&[
            ("swagger:extension:x-rate", "{\"limit\": 10}"),
            ("openapi:extension:x-owner", "team blue"),
            ("swagger:extension:x-flag", "true"),
            ("swagger:summary", "ignored"),
        ]));
        assert_eq!(ext["x-rate"], json!({"limit": 10}));
        assert_eq!(ext["x-owner"], json!("team blue"));
        assert_eq!(ext["x-flag"], json!(true));
        assert_eq!(ext.len(), 3);
    }

    #[test]
    fn test_drops_non_x_keys() {
        let ext = extensions_from_meta(&meta(&[("swagger:extension:rate", "1")]));
        assert!(ext.is_empty());
    }

    #[test]
    fn test_merge_last_write_wins() {
        let target: Extensions = [("x-a".to_string(), json!(1)), ("x-b".to_string(), json!(2))]
            .into_iter()
            .collect();
        let design: Extensions = [("x-b".to_string(), json!(3)), ("x-c".to_string(), json!(4))]
            .into_iter()
            .collect();
        let merged = merge(target, &design);
        assert_eq!(merged["x-a"], json!(1));
        assert_eq!(merged["x-b"], json!(3));
        assert_eq!(merged["x-c"], json!(4));
    }
}
