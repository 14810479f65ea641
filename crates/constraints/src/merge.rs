//! Recursive merge of constraint trees.
//!
//! Mappings merge key-by-key, every other value replaces whatever the
//! target held at that key.

use serde_json::{Map, Value};

/// How arrays found in both trees are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayMerge {
    /// The source array replaces the target value wholesale.
    #[default]
    Replace,
    /// Element `i` of the source merges into element `i` of the target,
    /// extending the target when the source is longer. Only applies when
    /// the target also holds an array at that key.
    ByIndex,
}

/// Merge `source` into `target` in place, treating arrays as atomic values.
///
/// Returns `target` for chaining.
pub fn deep_merge<'a>(
    target: &'a mut Map<String, Value>,
    source: &Map<String, Value>,
) -> &'a mut Map<String, Value> {
    deep_merge_with(target, source, ArrayMerge::Replace)
}

/// Merge `source` into `target` in place with an explicit array strategy.
pub fn deep_merge_with<'a>(
    target: &'a mut Map<String, Value>,
    source: &Map<String, Value>,
    arrays: ArrayMerge,
) -> &'a mut Map<String, Value> {
    for (key, incoming) in source {
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, incoming, arrays),
            None => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
    target
}

fn merge_value(existing: &mut Value, incoming: &Value, arrays: ArrayMerge) {
    match (existing, incoming) {
        (Value::Object(target), Value::Object(source)) => {
            deep_merge_with(target, source, arrays);
        }
        (Value::Array(target), Value::Array(source)) if arrays == ArrayMerge::ByIndex => {
            for (i, item) in source.iter().enumerate() {
                match target.get_mut(i) {
                    Some(slot) => merge_value(slot, item, arrays),
                    None => target.push(item.clone()),
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn nested_mappings_merge_key_by_key() {
        let mut target = map(json!({
            "audio": true,
            "video": { "facingMode": "environment", "aspectRatio": { "ideal": 1.5 } }
        }));
        let source = map(json!({ "video": { "aspectRatio": { "exact": 2.0 } } }));

        deep_merge(&mut target, &source);

        assert_eq!(
            Value::Object(target),
            json!({
                "audio": true,
                "video": {
                    "facingMode": "environment",
                    "aspectRatio": { "ideal": 1.5, "exact": 2.0 }
                }
            })
        );
    }

    #[test]
    fn leaf_override_wins_and_absent_keys_are_added() {
        let mut target = map(json!({ "video": { "facingMode": "environment" } }));
        let source = map(json!({ "video": { "facingMode": "user", "width": 1280 } }));

        deep_merge(&mut target, &source);

        assert_eq!(target["video"]["facingMode"], "user");
        assert_eq!(target["video"]["width"], 1280);
    }

    #[test]
    fn mapping_replaces_scalar_at_same_key() {
        let mut target = map(json!({ "audio": true }));
        let source = map(json!({ "audio": { "echoCancellation": false } }));

        deep_merge(&mut target, &source);

        assert_eq!(target["audio"], json!({ "echoCancellation": false }));
    }

    #[test]
    fn scalar_replaces_mapping_at_same_key() {
        let mut target = map(json!({ "video": { "facingMode": "environment" } }));
        let source = map(json!({ "video": false }));

        deep_merge(&mut target, &source);

        assert_eq!(target["video"], json!(false));
    }

    #[test]
    fn arrays_are_replaced_wholesale_by_default() {
        let mut target = map(json!({ "advanced": [{ "torch": false }, { "zoom": 2 }] }));
        let source = map(json!({ "advanced": [{ "torch": true }] }));

        deep_merge(&mut target, &source);

        assert_eq!(target["advanced"], json!([{ "torch": true }]));
    }

    #[test]
    fn by_index_merges_array_elements() {
        let mut target = map(json!({ "advanced": [{ "torch": false, "zoom": 2 }] }));
        let source = map(json!({ "advanced": [{ "torch": true }, { "exposureMode": "manual" }] }));

        deep_merge_with(&mut target, &source, ArrayMerge::ByIndex);

        assert_eq!(
            target["advanced"],
            json!([{ "torch": true, "zoom": 2 }, { "exposureMode": "manual" }])
        );
    }

    #[test]
    fn merge_returns_the_target_for_chaining() {
        let mut target = map(json!({ "a": 1 }));
        let len = deep_merge(&mut target, &map(json!({ "b": 2 }))).len();
        assert_eq!(len, 2);
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::from),
        ]
    }

    fn tree() -> impl Strategy<Value = Map<String, Value>> {
        let value = leaf().prop_recursive(3, 16, 4, |inner| {
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        });
        prop::collection::btree_map("[a-h]", value, 0..5).prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn disjoint_trees_merge_to_their_union(a in tree(), b in tree()) {
            let b: Map<String, Value> = b
                .into_iter()
                .map(|(k, v)| (format!("x{k}"), v))
                .collect();
            let mut merged = a.clone();
            deep_merge(&mut merged, &b);

            prop_assert_eq!(merged.len(), a.len() + b.len());
            for (k, v) in a.iter().chain(b.iter()) {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }

        #[test]
        fn source_leaves_always_win(a in tree(), key in "[a-h]", value in leaf()) {
            let mut source = Map::new();
            source.insert(key.clone(), value.clone());
            let mut merged = a;
            deep_merge(&mut merged, &source);
            prop_assert_eq!(merged.get(&key), Some(&value));
        }

        #[test]
        fn merging_into_empty_yields_source(b in tree()) {
            let mut merged = Map::new();
            deep_merge(&mut merged, &b);
            prop_assert_eq!(merged, b);
        }
    }
}
