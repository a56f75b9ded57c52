//! Structural validation of raw entity records.
//!
//! Input arrives as dynamic JSON, so shape has to be checked before any graph
//! state is touched: the record must be an object, its `id` a non-empty
//! string, its `deps` (when present) an array of non-empty strings or null.
//! These checks are pure; conversion to a [`Node`] happens only after a
//! record passes.

use crate::engine::view::Node;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys interpreted by the engine rather than carried as display attributes.
const ID_KEY: &str = "id";
const DEPS_KEY: &str = "deps";

/// Prefix reserving a key for engine-internal use.
const RESERVED_PREFIX: char = '_';

/// Validate one raw entity record.
///
/// `context` is the map key the record was found under when ingesting the
/// mapping form; it attributes shape errors. The record's own `id` field is
/// validated in both forms, even though the mapping key wins as the
/// canonical id.
pub(crate) fn check_entity(record: &Value, context: Option<&str>) -> Result<()> {
    let Some(fields) = record.as_object() else {
        return Err(Error::Shape {
            context: context.map(str::to_owned),
            got: record.to_string(),
        });
    };

    let id = check_entity_id(fields.get(ID_KEY))?;

    match fields.get(DEPS_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                check_dep_id(&id, item)?;
            }
        }
        Some(other) => {
            return Err(Error::DepsType {
                id,
                got: other.to_string(),
            });
        }
    }

    Ok(())
}

fn check_entity_id(value: Option<&Value>) -> Result<String> {
    match value {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        other => Err(Error::EntityName {
            got: other.map_or_else(|| "nothing".to_string(), Value::to_string),
        }),
    }
}

fn check_dep_id(parent: &str, value: &Value) -> Result<()> {
    match value {
        Value::String(id) if !id.is_empty() => Ok(()),
        other => Err(Error::DependencyName {
            parent: parent.to_string(),
            got: other.to_string(),
        }),
    }
}

/// Validate one raw record and convert it into a node.
///
/// In mapping form the outer map key is canonical and overrides the record's
/// own `id` field. Keys with the reserved `_` prefix are engine-internal and
/// never become display attributes; every other non-string scalar is carried
/// as its JSON rendering.
pub(crate) fn parse_entity(record: &Value, id_override: Option<&str>) -> Result<Node> {
    check_entity(record, id_override)?;
    let Some(fields) = record.as_object() else {
        // check_entity already rejected this shape
        return Err(Error::Shape {
            context: id_override.map(str::to_owned),
            got: record.to_string(),
        });
    };

    let id = id_override
        .map(str::to_owned)
        .or_else(|| {
            fields
                .get(ID_KEY)
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_default();

    let mut attributes = BTreeMap::new();
    for (key, value) in fields {
        if key == ID_KEY || key == DEPS_KEY || key.starts_with(RESERVED_PREFIX) {
            continue;
        }
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        attributes.insert(key.clone(), text);
    }

    let deps = match fields.get(DEPS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
        ),
        // Unreachable after check_entity; treat as leaf.
        Some(_) => None,
    };

    Ok(Node::new(id, attributes, deps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn accepts_a_minimal_entity() {
        check_entity(&json!({ "id": "a" }), None).expect("valid entity");
    }

    #[test]
    fn accepts_null_and_absent_deps() {
        check_entity(&json!({ "id": "a", "deps": null }), None).expect("null deps");
        check_entity(&json!({ "id": "a", "deps": ["b", "c"] }), None).expect("listed deps");
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!("just a string"))]
    #[case(json!(3))]
    fn rejects_non_object_records(#[case] record: Value) {
        let err = check_entity(&record, Some("key")).expect_err("shape error");
        assert!(matches!(err, Error::Shape { context: Some(c), .. } if c == "key"));
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "id": "" }))]
    #[case(json!({ "id": 7 }))]
    #[case(json!({ "id": null }))]
    fn rejects_bad_entity_ids(#[case] record: Value) {
        let err = check_entity(&record, None).expect_err("name error");
        assert!(matches!(err, Error::EntityName { .. }));
    }

    #[rstest]
    #[case(json!({ "id": "a", "deps": [""] }))]
    #[case(json!({ "id": "a", "deps": ["b", 4] }))]
    #[case(json!({ "id": "a", "deps": [null] }))]
    fn rejects_bad_dependency_ids(#[case] record: Value) {
        let err = check_entity(&record, None).expect_err("dep name error");
        assert!(matches!(err, Error::DependencyName { parent, .. } if parent == "a"));
    }

    #[rstest]
    #[case(json!({ "id": "a", "deps": "b" }))]
    #[case(json!({ "id": "a", "deps": 9 }))]
    #[case(json!({ "id": "a", "deps": {} }))]
    fn rejects_non_array_deps(#[case] record: Value) {
        let err = check_entity(&record, None).expect_err("deps type error");
        assert!(matches!(err, Error::DepsType { id, .. } if id == "a"));
    }

    #[test]
    fn attributes_carry_through_and_reserved_keys_do_not() {
        let record = json!({
            "id": "a",
            "deps": ["b"],
            "role": "Queen",
            "born": 1926,
            "_internal": "flag"
        });
        let node = parse_entity(&record, None).expect("valid entity");
        assert_eq!(node.id, "a");
        assert_eq!(node.attributes.get("role").map(String::as_str), Some("Queen"));
        assert_eq!(node.attributes.get("born").map(String::as_str), Some("1926"));
        assert!(!node.attributes.contains_key("_internal"));
        assert_eq!(node.dep_count(), 1);
    }

    #[test]
    fn mapping_key_overrides_the_record_id() {
        let record = json!({ "id": "display name", "deps": null });
        let node = parse_entity(&record, Some("canonical")).expect("valid entity");
        assert_eq!(node.id, "canonical");
        assert!(node.deps.is_none());
    }

    #[rstest]
    #[case(json!({ "deps": ["db"] }))]
    #[case(json!({ "id": "", "deps": ["db"] }))]
    #[case(json!({ "id": 7 }))]
    fn mapping_records_still_require_a_valid_id_field(#[case] record: Value) {
        let err = parse_entity(&record, Some("web")).expect_err("bad inner id");
        assert!(matches!(err, Error::EntityName { .. }));
    }
}
