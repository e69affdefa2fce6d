//! Dotted-path access into configuration trees.

use serde_json::Value;

/// Walk `tree` along a dotted path such as `video.core.supported_formats`.
///
/// Returns `None` as soon as a segment is missing or the current node is not
/// an object. Every segment is a key, so an empty path looks up the key `""`.
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(tree, |node, key| node.as_object()?.get(key))
}

/// Like [`lookup`], returning an owned copy of the value or `default`.
pub fn get_nested(tree: &Value, path: &str, default: Value) -> Value {
    lookup(tree, path).cloned().unwrap_or(default)
}

/// Fetch and deserialize a value at `path`, `None` if absent or mistyped.
pub fn get_as<T: serde::de::DeserializeOwned>(tree: &Value, path: &str) -> Option<T> {
    lookup(tree, path).and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "video": {
                "core": {
                    "supported_formats": [".mp4", ".avi"],
                    "max_resolution": [1920, 1080]
                }
            },
            "application": {"core": {"name": "GuitarTrainer"}}
        })
    }

    #[test]
    fn test_lookup_leaf() {
        let tree = sample();
        assert_eq!(
            lookup(&tree, "application.core.name"),
            Some(&json!("GuitarTrainer"))
        );
    }

    #[test]
    fn test_lookup_subtree() {
        let tree = sample();
        let core = lookup(&tree, "video.core").unwrap();
        assert!(core.is_object());
        assert_eq!(core["max_resolution"], json!([1920, 1080]));
    }

    #[test]
    fn test_missing_segment_returns_default() {
        let tree = sample();
        assert_eq!(
            get_nested(&tree, "nonexistent.path", json!("NOT_FOUND")),
            json!("NOT_FOUND")
        );
    }

    #[test]
    fn test_walk_through_scalar_returns_default() {
        let tree = sample();
        // "name" is a string, so "name.first" cannot be walked
        assert_eq!(
            get_nested(&tree, "application.core.name.first", Value::Null),
            Value::Null
        );
        // sequences are not trees either
        assert!(lookup(&tree, "video.core.supported_formats.0").is_none());
    }

    #[test]
    fn test_get_as_typed() {
        let tree = sample();
        let formats: Option<Vec<String>> = get_as(&tree, "video.core.supported_formats");
        assert_eq!(formats, Some(vec![".mp4".to_string(), ".avi".to_string()]));
        let wrong: Option<u32> = get_as(&tree, "video.core.supported_formats");
        assert!(wrong.is_none());
    }

    #[test]
    fn test_empty_path_is_a_key() {
        let tree = sample();
        assert_eq!(lookup(&tree, ""), None);
        assert_eq!(get_nested(&tree, "", json!("fallback")), json!("fallback"));

        let keyed = json!({"": 7});
        assert_eq!(lookup(&keyed, ""), Some(&json!(7)));
    }
}
