//! Declared-variable handling for run payloads.
//!
//! Task and pipeline definitions carry a variable table where each entry may
//! declare a `value` (user-supplied) and/or a `default`. Run payloads want a
//! flat `{name: scalar}` map.

use crate::error::UtilsError;
use serde_json::{Map, Value};

/// Flatten a declared-variable table into a plain map.
///
/// Per entry: `value` wins when present and non-null, else `default` when
/// present and non-null, else the entry is dropped entirely.
pub fn flatten_variables(decls: &Value) -> Map<String, Value> {
    let mut flat = Map::new();

    if let Some(table) = decls.as_object() {
        for (name, decl) in table {
            let picked = decl
                .get("value")
                .filter(|v| !v.is_null())
                .or_else(|| decl.get("default").filter(|v| !v.is_null()));

            if let Some(value) = picked {
                flat.insert(name.clone(), value.clone());
            }
        }
    }

    flat
}

/// Parse a `key=value` override from the command line
pub fn parse_override(raw: &str) -> crate::Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(UtilsError::InputProcessing {
            message: format!("Invalid variable '{}': expected key=value", raw),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_prefers_value_over_default() {
        let decls = json!({
            "x": {"value": 5},
            "y": {"default": 7},
            "z": {}
        });

        let flat = flatten_variables(&decls);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("x"), Some(&json!(5)));
        assert_eq!(flat.get("y"), Some(&json!(7)));
        assert!(!flat.contains_key("z"));
    }

    #[test]
    fn test_flatten_null_value_falls_back_to_default() {
        let decls = json!({
            "image": {"value": null, "default": "ubuntu:22.04"},
            "tag": {"value": null, "default": null}
        });

        let flat = flatten_variables(&decls);
        assert_eq!(flat.get("image"), Some(&json!("ubuntu:22.04")));
        assert!(!flat.contains_key("tag"));
    }

    #[test]
    fn test_flatten_skips_non_object_entries() {
        let decls = json!({"plain": "string", "ok": {"value": "v"}});
        let flat = flatten_variables(&decls);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("ok"), Some(&json!("v")));
    }

    #[test]
    fn test_flatten_tolerates_non_object_input() {
        assert!(flatten_variables(&json!(null)).is_empty());
        assert!(flatten_variables(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("host=db-1").unwrap(),
            ("host".to_string(), "db-1".to_string())
        );
        // Values may contain '=' or be empty
        assert_eq!(
            parse_override("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_override("flag=").unwrap(),
            ("flag".to_string(), String::new())
        );

        assert!(parse_override("no-separator").is_err());
        assert!(parse_override("=value").is_err());
    }
}
