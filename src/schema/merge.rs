use serde_json::Value;

/// Deep-merge `incoming` into `target`.
///
/// Objects merge recursively by key; scalar and array leaves are
/// last-writer-wins (the incoming value replaces the existing one). Keys
/// present only in `target` are never touched.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disjoint_keys_preserved() {
        let mut target = json!({ "a": 1 });
        deep_merge(&mut target, json!({ "b": 2 }));
        assert_eq!(target, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_nested_merge() {
        let mut target = json!({ "paths": { "/a": { "get": { "summary": "GET" } } } });
        deep_merge(
            &mut target,
            json!({ "paths": { "/a": { "post": { "summary": "POST" } } } }),
        );
        assert_eq!(target["paths"]["/a"]["get"]["summary"], "GET");
        assert_eq!(target["paths"]["/a"]["post"]["summary"], "POST");
    }

    #[test]
    fn test_scalar_leaf_last_writer_wins() {
        let mut target = json!({ "a": { "b": 1, "keep": true } });
        deep_merge(&mut target, json!({ "a": { "b": 2 } }));
        assert_eq!(target, json!({ "a": { "b": 2, "keep": true } }));
    }

    #[test]
    fn test_arrays_overwrite() {
        let mut target = json!({ "tags": ["a", "b"] });
        deep_merge(&mut target, json!({ "tags": ["c"] }));
        assert_eq!(target["tags"], json!(["c"]));
    }

    #[test]
    fn test_object_replaces_scalar() {
        let mut target = json!({ "a": 1 });
        deep_merge(&mut target, json!({ "a": { "b": 2 } }));
        assert_eq!(target, json!({ "a": { "b": 2 } }));
    }
}
