//! Save-model sanitization
//!
//! Anything handed to the diff worker goes through [`sanitize`] first: the
//! payload must be plain, owned data with no renderer-only bookkeeping.

use serde_json::{Map, Value};

/// Key prefixes that mark renderer-private state
pub const TRANSIENT_PREFIXES: &[&str] = &["$$", "__"];

/// Whether an object key is renderer-private
#[inline]
#[must_use]
pub fn is_transient_key(key: &str) -> bool {
    TRANSIENT_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Strip `null` object entries and transient keys, recursively
///
/// Array positions are preserved: a `null` inside an array stays, since
/// removing it would shift every later index.
#[must_use]
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, value)| !value.is_null() && !is_transient_key(key))
        .map(|(key, value)| (key, sanitize(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strips_nulls_and_transient_keys_recursively() {
        let raw = json!({
            "title": "Ops",
            "uid": null,
            "$$hashKey": "object:12",
            "layout": [
                {"kind": "item", "__runtime": {"ticks": 3}, "panel": {"options": null, "title": "CPU"}}
            ]
        });

        assert_eq!(
            sanitize(raw),
            json!({
                "title": "Ops",
                "layout": [{"kind": "item", "panel": {"title": "CPU"}}]
            })
        );
    }

    #[test]
    fn keeps_array_positions() {
        assert_eq!(sanitize(json!([1, null, 3])), json!([1, null, 3]));
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(sanitize(json!("text")), json!("text"));
        assert_eq!(sanitize(Value::Null), Value::Null);
    }

    #[test]
    fn only_prefixed_keys_are_transient() {
        assert!(is_transient_key("$$hashKey"));
        assert!(is_transient_key("__private"));
        assert!(!is_transient_key("$var"));
        assert!(!is_transient_key("title"));
    }
}
