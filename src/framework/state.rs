//! State payloads and the helpers that re-root them.
//!
//! A state is a JSON value, in practice a mapping. Notifications re-root a
//! payload under the segments between a watcher and the changed resource;
//! subtree reads compose many resources' states into one tree.

use serde_json::{Map, Value};

/// Externally visible snapshot of a resource.
pub type State = Value;

/// Wraps `state` in one mapping level per segment.
///
/// `nest(["detector"], {"state": "LISTENING"})` is
/// `{"detector": {"state": "LISTENING"}}`. No segments returns `state` as is.
pub fn nest(segments: &[String], state: State) -> State {
    segments.iter().rev().fold(state, |inner, segment| {
        let mut outer = Map::new();
        outer.insert(segment.clone(), inner);
        Value::Object(outer)
    })
}

/// Follows `segments` down through nested mappings. `None` if any is absent.
pub fn descend<'a>(state: &'a State, segments: &[String]) -> Option<&'a State> {
    segments
        .iter()
        .try_fold(state, |current, segment| current.as_object()?.get(segment))
}

/// Places `state` at `segments` inside `root`, creating mappings on the way.
///
/// When the target already holds a mapping and `state` is one too, the two
/// are merged with `state` winning on key clashes. Any non-mapping found on
/// the way is replaced.
pub fn insert_nested(root: &mut Map<String, Value>, segments: &[String], state: State) {
    let Some((last, parents)) = segments.split_last() else {
        if let Value::Object(entries) = state {
            root.extend(entries);
        }
        return;
    };

    let mut current = root;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }

    let merge = state.is_object() && matches!(current.get(last), Some(Value::Object(_)));
    if !merge {
        current.insert(last.clone(), state);
        return;
    }
    if let (Some(Value::Object(existing)), Value::Object(entries)) = (current.get_mut(last), state) {
        existing.extend(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nest_wraps_per_segment() {
        let state = json!({"state": "LISTENING"});
        assert_eq!(
            nest(&segs(&["speech", "detector"]), state.clone()),
            json!({"speech": {"detector": {"state": "LISTENING"}}})
        );
        assert_eq!(nest(&[], state.clone()), state);
    }

    #[test]
    fn descend_stops_on_missing_segment() {
        let data = json!({"a": {"b": {"volume": 3}}});
        assert_eq!(descend(&data, &segs(&["a", "b"])), Some(&json!({"volume": 3})));
        assert_eq!(descend(&data, &segs(&["a", "c"])), None);
        assert_eq!(descend(&data, &segs(&["a", "b", "volume", "x"])), None);
        assert_eq!(descend(&data, &[]), Some(&data));
    }

    #[test]
    fn insert_nested_merges_parent_and_child() {
        let mut root = Map::new();
        insert_nested(&mut root, &segs(&["a"]), json!({"state": "ON"}));
        insert_nested(&mut root, &segs(&["a", "b"]), json!({"state": "OFF"}));
        insert_nested(&mut root, &segs(&["c", "d"]), json!({"level": 1}));
        assert_eq!(
            Value::Object(root),
            json!({
                "a": {"state": "ON", "b": {"state": "OFF"}},
                "c": {"d": {"level": 1}}
            })
        );
    }
}
