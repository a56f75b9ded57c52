//! Whole-graph consistency findings and structural export.
//!
//! Findings are soft: duplicate edges, missing entities, and cycles are
//! recorded and reported, never raised as errors. Acyclicity is probed by
//! attempting a full structural export of the upstream view; the export
//! recurses through dependency handles, so it succeeds exactly when no
//! entity is reachable from itself. When the probe fails, the participating
//! entities are enumerated with petgraph's strongly-connected-components
//! pass so the report can name each cycle.

use crate::engine::link::DuplicateEdge;
use crate::engine::view::{NodeId, NodeKind, View};
use crate::error::{Error, Result};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Outcome of a consistency check over the linked graph.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// True when no entity declared the same dependency twice.
    pub no_duplicate_dependencies: bool,

    /// True when every referenced id was declared.
    pub no_missing_entities: bool,

    /// True when the upstream graph is acyclic.
    pub no_cycles: bool,

    /// Every recorded duplicate declaration, verbatim.
    pub duplicate_dependencies: Vec<DuplicateEdge>,

    /// Every synthesized placeholder id, verbatim.
    pub missing_entities: Vec<String>,

    /// Participant ids of each cycle found, one list per cycle. Empty when
    /// `no_cycles` is true.
    pub cycles: Vec<Vec<String>>,
}

impl Report {
    /// True when all findings are clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.no_duplicate_dependencies && self.no_missing_entities && self.no_cycles
    }
}

/// Export the upstream view as one JSON object keyed by entity id, with
/// dependencies embedded recursively.
///
/// Fails with [`Error::Cyclic`] if any entity is reached on its own path,
/// which is exactly the reporter's acyclicity probe.
pub(crate) fn export(view: &View) -> Result<Value> {
    let mut entities = Map::new();
    for handle in view.handles() {
        let mut on_path = HashSet::new();
        let exported = export_node(view, handle, &mut on_path)?;
        entities.insert(view.node(handle).id.clone(), exported);
    }
    Ok(Value::Object(entities))
}

fn export_node(view: &View, handle: NodeId, on_path: &mut HashSet<NodeId>) -> Result<Value> {
    if !on_path.insert(handle) {
        return Err(Error::Cyclic(view.node(handle).id.clone()));
    }

    let node = view.node(handle);
    let mut fields = Map::new();
    fields.insert("id".to_string(), Value::String(node.id.clone()));
    if node.kind == NodeKind::Missing {
        fields.insert("missing".to_string(), Value::Bool(true));
    }
    if let Some(note) = &node.note {
        fields.insert("note".to_string(), Value::String(note.clone()));
    }
    if !node.attributes.is_empty() {
        let attributes = node
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        fields.insert("attributes".to_string(), Value::Object(attributes));
    }
    if node.deps.is_some() {
        let mut deps = Vec::with_capacity(node.dep_count());
        for slot in node.deps.as_deref().unwrap_or(&[]) {
            if let Some(child) = slot.handle() {
                deps.push(export_node(view, child, on_path)?);
            }
        }
        fields.insert("deps".to_string(), Value::Array(deps));
    }

    on_path.remove(&handle);
    Ok(Value::Object(fields))
}

/// Enumerate cycles in the view as strongly connected components.
///
/// Each returned list holds the ids of one cycle's participants; trivial
/// single-node components are reported only for self-loops.
pub(crate) fn find_cycles(view: &View) -> Vec<Vec<String>> {
    let mut graph = DiGraph::<NodeId, ()>::new();
    let mut indices = std::collections::HashMap::new();

    for handle in view.handles() {
        indices.insert(handle, graph.add_node(handle));
    }
    for handle in view.handles() {
        let Some(&from) = indices.get(&handle) else {
            continue;
        };
        for slot in view.node(handle).deps.as_deref().unwrap_or(&[]) {
            if let Some(dep) = slot.handle() {
                if let Some(&to) = indices.get(&dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.find_edge(n, n).is_some())
        })
        .map(|component| {
            component
                .into_iter()
                .map(|n| view.node(graph[n]).id.clone())
                .collect()
        })
        .collect()
}
