//! Deep merge of configuration trees.
//!
//! Objects are merged key by key; everything else is replaced by the later
//! document. Sequences are replaced entirely, not concatenated.

use serde_json::{Map, Value};

/// Deep merge two trees, with `overlay` taking precedence over `base`.
///
/// - Object + object: union of keys, merged recursively
/// - Any other pairing (scalar, sequence, null, or object vs. non-object):
///   `overlay` replaces `base` outright
///
/// # Example
/// ```
/// use serde_json::json;
/// use guitar_trainer::config::deep_merge;
///
/// let base = json!({"video": {"core": {"fps": 30, "formats": [".mp4"]}}});
/// let overlay = json!({"video": {"core": {"fps": 60}}});
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged, json!({"video": {"core": {"fps": 60, "formats": [".mp4"]}}}));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge documents in order, later documents taking precedence.
///
/// Starts from an empty object, so the result is always an object as long as
/// every document is one.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_simple_objects() {
        let result = deep_merge(json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4}));
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_sibling_namespaces() {
        // video.core and video.experimental come from different files
        let base = json!({"video": {"core": {"supported_formats": [".mp4"]}}});
        let overlay = json!({"video": {"experimental": {"hw_decode": true}}});
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            json!({
                "video": {
                    "core": {"supported_formats": [".mp4"]},
                    "experimental": {"hw_decode": true}
                }
            })
        );
    }

    #[test]
    fn test_sequences_replaced_not_concatenated() {
        let base = json!({"formats": [".mp4", ".avi"]});
        let overlay = json!({"formats": [".mkv"]});
        assert_eq!(deep_merge(base, overlay), json!({"formats": [".mkv"]}));
    }

    #[test]
    fn test_later_null_wins() {
        let base = json!({"max_resolution": [1920, 1080]});
        let overlay = json!({"max_resolution": null});
        assert_eq!(deep_merge(base, overlay), json!({"max_resolution": null}));
    }

    #[test]
    fn test_deep_nested_merge() {
        let base = json!({"l1": {"l2": {"l3": {"a": 1, "b": 2}}}});
        let overlay = json!({"l1": {"l2": {"l3": {"b": 3, "c": 4}}}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"l1": {"l2": {"l3": {"a": 1, "b": 3, "c": 4}}}})
        );
    }

    #[test]
    fn test_merge_all_last_writer_wins() {
        let docs = vec![json!({"a": 1}), json!({"b": 2}), json!({"a": 3, "c": 4})];
        assert_eq!(deep_merge_all(docs), json!({"a": 3, "b": 2, "c": 4}));
    }

    #[test]
    fn test_merge_all_empty_is_empty_object() {
        assert_eq!(deep_merge_all(Vec::new()), json!({}));
    }

    #[test]
    fn test_scalar_replaced_by_tree() {
        let result = deep_merge(json!({"value": 42}), json!({"value": {"nested": true}}));
        assert_eq!(result, json!({"value": {"nested": true}}));
    }

    #[test]
    fn test_tree_replaced_by_scalar() {
        let result = deep_merge(json!({"value": {"nested": true}}), json!({"value": 42}));
        assert_eq!(result, json!({"value": 42}));
    }
}
