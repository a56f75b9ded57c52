//! Building and linking the upstream/downstream views.
//!
//! Linking runs two sequential passes. Pass 1 walks every upstream entity,
//! synthesizes placeholders for undeclared dependencies, resolves upstream
//! dependency slots to arena handles, and builds the mirrored downstream
//! adjacency by appending each dependent's id to its dependency's downstream
//! node. Pass 2 then resolves the downstream slots, which is only possible
//! once Pass 1 has discovered every edge. Duplicate edges are warned about
//! and recorded once, but both occurrences are kept so rendering surfaces
//! the duplication instead of silently deduplicating.

use crate::engine::validate::parse_entity;
use crate::engine::view::{DepSlot, Node, NodeId, NodeKind, View};
use crate::error::{Error, Result};
use crate::options::Options;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One recorded duplicate declaration: `dependent` listed `dependency` more
/// than once in its deps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEdge {
    /// The entity whose deps list repeats an id.
    pub dependent: String,
    /// The repeated dependency id.
    pub dependency: String,
}

impl fmt::Display for DuplicateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.dependent, self.dependency)
    }
}

impl Serialize for DuplicateEdge {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validate raw records and populate the upstream view.
///
/// Accepts the sequence form (array of records) or the pre-keyed mapping
/// form. Sequence entries collide on repeated ids; map keys are unique by
/// construction and are taken as the canonical ids.
pub(crate) fn populate_upstream(upstream: &mut View, data: &Value) -> Result<()> {
    match data {
        Value::Array(records) => {
            for record in records {
                let node = parse_entity(record, None)?;
                upstream.insert(node)?;
            }
        }
        Value::Object(records) => {
            for (key, record) in records {
                let node = parse_entity(record, Some(key))?;
                upstream.insert(node)?;
            }
        }
        other => {
            return Err(Error::Shape {
                context: None,
                got: other.to_string(),
            });
        }
    }
    Ok(())
}

/// Resolve upstream references and populate the downstream view (Pass 1),
/// then resolve downstream references (Pass 2).
pub(crate) fn link(
    upstream: &mut View,
    downstream: &mut View,
    options: &Options,
    missing_entities: &mut Vec<String>,
    duplicate_edges: &mut Vec<DuplicateEdge>,
) {
    // Pass 1. Missing entities synthesized mid-scan land at the end of the
    // arena and are revisited by the same loop; they carry no deps, so the
    // revisit only guarantees their downstream twin exists.
    let mut i = 0;
    while i < upstream.len() {
        let entity = NodeId(i);
        i += 1;

        let entity_id = upstream.node(entity).id.clone();
        downstream.ensure(upstream.node(entity).copy_without_deps());

        for slot in 0..upstream.node(entity).dep_count() {
            let dep_id = match upstream.node(entity).deps.as_deref() {
                Some(deps) => match &deps[slot] {
                    DepSlot::Name(name) => name.clone(),
                    DepSlot::Handle(_) => continue,
                },
                None => continue,
            };

            let dep = match upstream.lookup(&dep_id) {
                Some(handle) => handle,
                None => {
                    missing_entities.push(dep_id.clone());
                    upstream.ensure(missing_entity(&dep_id, options))
                }
            };

            if let Some(deps) = upstream.node_mut(entity).deps.as_mut() {
                deps[slot] = DepSlot::Handle(dep);
            }

            let down_dep = downstream.ensure(upstream.node(dep).copy_without_deps());
            let down_deps = downstream
                .node_mut(down_dep)
                .deps
                .get_or_insert_with(Vec::new);

            let duplicate = down_deps
                .iter()
                .any(|slot| matches!(slot, DepSlot::Name(name) if *name == entity_id));
            if duplicate {
                tracing::warn!(
                    dependent = %entity_id,
                    dependency = %dep_id,
                    "entity declares the same dependency more than once"
                );
                let edge = DuplicateEdge {
                    dependent: entity_id.clone(),
                    dependency: dep_id.clone(),
                };
                if !duplicate_edges.contains(&edge) {
                    duplicate_edges.push(edge);
                }
            }
            down_deps.push(DepSlot::Name(entity_id.clone()));
        }
    }

    // Pass 2: every downstream id now has a node, so slot resolution cannot
    // dangle.
    for i in 0..downstream.len() {
        let entity = NodeId(i);
        for slot in 0..downstream.node(entity).dep_count() {
            let name = match downstream.node(entity).deps.as_deref() {
                Some(deps) => match &deps[slot] {
                    DepSlot::Name(name) => name.clone(),
                    DepSlot::Handle(_) => continue,
                },
                None => continue,
            };
            if let Some(handle) = downstream.lookup(&name) {
                if let Some(deps) = downstream.node_mut(entity).deps.as_mut() {
                    deps[slot] = DepSlot::Handle(handle);
                }
            }
        }
    }
}

/// Synthesize a placeholder for a referenced-but-undeclared id.
///
/// Placeholders are created in the upstream view only; Pass 1 mirrors them
/// into downstream like any other node.
fn missing_entity(id: &str, options: &Options) -> Node {
    let note = options.missing_note.resolve(id, || {
        format!(
            "\"{id}\" was not found in the input entity list and was added as a placeholder. \
             It may have dependencies of its own."
        )
    });
    Node {
        id: id.to_string(),
        attributes: BTreeMap::new(),
        kind: NodeKind::Missing,
        note: Some(note),
        cyclic_paths: Vec::new(),
        deps: None,
    }
}
