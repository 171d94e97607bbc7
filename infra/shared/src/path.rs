//! Dot-separated path addressing over a `serde_json` object tree.
//!
//! Reads fail soft: any missing, null or non-object segment on the way down
//! resolves to `None`. Writes force their way through: missing or non-object
//! intermediate segments are replaced with empty objects.

use serde_json::{Map, Value};

pub(crate) const SEPARATOR: char = '.';

pub(crate) fn resolve<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(SEPARATOR);
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub(crate) fn assign(root: &mut Map<String, Value>, path: &str, value: Value) {
    let (parents, leaf) = match path.rsplit_once(SEPARATOR) {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = root;
    for segment in parents.into_iter().flat_map(|p| p.split(SEPARATOR)) {
        current = ensure_object(current.entry(segment).or_insert_with(empty_object));
    }
    current.insert(leaf.to_owned(), value);
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = empty_object();
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn resolves_nested_values() {
        let root = tree(json!({ "user": { "profile": { "name": "Ada" } } }));
        assert_eq!(resolve(&root, "user.profile.name"), Some(&json!("Ada")));
        assert_eq!(resolve(&root, "user.profile"), Some(&json!({ "name": "Ada" })));
    }

    #[test]
    fn resolution_fails_soft_on_type_mismatch() {
        let root = tree(json!({ "n": 5, "null": null, "list": [1, 2], "obj": {} }));
        assert_eq!(resolve(&root, "n.x"), None);
        assert_eq!(resolve(&root, "null.x"), None);
        assert_eq!(resolve(&root, "list.0"), None);
        assert_eq!(resolve(&root, "obj.missing"), None);
        assert_eq!(resolve(&root, "missing"), None);
    }

    #[test]
    fn stored_null_and_falsy_values_resolve() {
        let root = tree(json!({ "null": null, "zero": 0, "no": false, "empty": "" }));
        for key in ["null", "zero", "no", "empty"] {
            assert!(resolve(&root, key).is_some(), "{key} should resolve");
        }
    }

    #[test]
    fn assign_creates_intermediate_objects() {
        let mut root = Map::new();
        assign(&mut root, "a.b.c", json!(1));
        assert_eq!(Value::Object(root), json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn assign_overwrites_non_object_segments() {
        let mut root = tree(json!({ "a": 5, "list": [1], "keep": true }));
        assign(&mut root, "a.b", json!(1));
        assign(&mut root, "list.x.y", json!("v"));
        assert_eq!(
            Value::Object(root),
            json!({ "a": { "b": 1 }, "list": { "x": { "y": "v" } }, "keep": true })
        );
    }

    #[test]
    fn assign_preserves_siblings() {
        let mut root = tree(json!({ "user": { "name": "Ada", "age": 36 } }));
        assign(&mut root, "user.age", json!(37));
        assert_eq!(Value::Object(root), json!({ "user": { "name": "Ada", "age": 37 } }));
    }

    #[test]
    fn single_segment_paths_touch_top_level() {
        let mut root = Map::new();
        assign(&mut root, "flat", json!([1, 2]));
        assert_eq!(resolve(&root, "flat"), Some(&json!([1, 2])));
    }
}
