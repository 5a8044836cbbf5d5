//! Action parameter maps.

use serde_json::{Map, Value};

/// Named parameters passed to an action handler.
pub type ActionParams = Map<String, Value>;

/// Merge `overrides` over `defaults`, key by key.
///
/// The merge is shallow: an override replaces the default value for its key
/// entirely, including nested objects. Explicit `null` overrides are kept so a
/// caller can unset a default.
pub fn merge_params(defaults: &ActionParams, overrides: &ActionParams) -> ActionParams {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        let _ = merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> ActionParams {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn override_wins() {
        let merged = merge_params(
            &params(json!({"name": "User", "count": 1})),
            &params(json!({"name": "Alice"})),
        );
        assert_eq!(merged["name"], "Alice");
        assert_eq!(merged["count"], 1);
    }

    #[test]
    fn empty_overrides_keep_defaults() {
        let defaults = params(json!({"duration": 2}));
        let merged = merge_params(&defaults, &ActionParams::new());
        assert_eq!(merged, defaults);
    }

    #[test]
    fn nested_objects_replaced_not_merged() {
        let merged = merge_params(
            &params(json!({"opts": {"a": 1, "b": 2}})),
            &params(json!({"opts": {"a": 9}})),
        );
        assert_eq!(merged["opts"], json!({"a": 9}));
    }

    #[test]
    fn null_override_is_kept() {
        let merged = merge_params(&params(json!({"x": 1})), &params(json!({"x": null})));
        assert!(merged["x"].is_null());
    }
}
