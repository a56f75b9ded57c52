//! Bounded, cycle-safe materialization of a tree view.
//!
//! The walk is a depth-first traversal over one linked view. Nodes on the
//! active DFS path are tracked in an explicit on-path set, so a node reached
//! through two independent paths is never mistaken for a cycle; only
//! same-path recurrence counts. Cycle points and depth-limit points are cut
//! by substituting an ephemeral clone into the parent's dependency slot, and
//! every substitution is recorded so [`restore`] can undo them in LIFO order
//! and leave the view structurally identical to its pre-walk state.
//!
//! Precedence is fixed: the cycle check runs before the depth check, so a
//! node that is both a cycle point and at the depth limit is always labeled
//! cyclic. Missing entities and leaves are never depth-truncated, since a
//! clone there would hide nothing.

use crate::engine::view::{DepSlot, Node, NodeId, NodeKind, View};
use crate::options::Options;
use std::collections::HashSet;

/// Separator used when composing cycle path strings.
const PATH_ARROW: &str = " → ";

/// One recorded clone substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Substitution {
    pub(crate) parent: NodeId,
    pub(crate) index: usize,
    pub(crate) original: NodeId,
}

/// Undo stack of every substitution made in the current pass, in order.
pub(crate) type SubstitutionLog = Vec<Substitution>;

/// Walk the view from `root`, substituting clones at cycle points and at the
/// configured depth limit.
///
/// The caller must restore any previous pass first; a second open pass would
/// see clone handles in dependency slots and corrupt the undo log.
pub(crate) fn materialize(
    view: &mut View,
    options: &Options,
    log: &mut SubstitutionLog,
    root: NodeId,
) {
    debug_assert!(log.is_empty(), "previous materialization was not restored");
    let mut on_path = HashSet::new();
    let mut path = vec![view.node(root).id.clone()];
    walk(view, options, log, root, 1, &mut path, &mut on_path);
    tracing::debug!(
        root = %view.node(root).id,
        substitutions = log.len(),
        "materialized tree"
    );
}

fn walk(
    view: &mut View,
    options: &Options,
    log: &mut SubstitutionLog,
    node: NodeId,
    depth: usize,
    path: &mut Vec<String>,
    on_path: &mut HashSet<NodeId>,
) {
    let dep_count = view.node(node).dep_count();
    if dep_count == 0 {
        return;
    }
    on_path.insert(node);

    for index in 0..dep_count {
        let child = match view.node(node).deps.as_deref() {
            Some(deps) => match deps[index].handle() {
                Some(handle) => handle,
                None => continue,
            },
            None => continue,
        };
        path.push(view.node(child).id.clone());

        if on_path.contains(&child) {
            substitute_cyclic(view, log, options, node, index, child, &path.join(PATH_ARROW));
        } else if view.node(child).kind == NodeKind::CyclicClone {
            // The slot was already substituted on an earlier path through
            // this parent; just accumulate the new path.
            let joined = path.join(PATH_ARROW);
            let clone = view.node_mut(child);
            if !clone.cyclic_paths.contains(&joined) {
                clone.cyclic_paths.push(joined);
            }
        } else if depth >= options.max_depth {
            let child_node = view.node(child);
            let truncates = child_node.kind != NodeKind::Missing && child_node.dep_count() > 0;
            if truncates {
                substitute_max_depth(view, log, options, node, index, child);
            }
        } else {
            walk(view, options, log, child, depth + 1, path, on_path);
        }

        path.pop();
    }

    on_path.remove(&node);
}

fn substitute_cyclic(
    view: &mut View,
    log: &mut SubstitutionLog,
    options: &Options,
    parent: NodeId,
    index: usize,
    child: NodeId,
    cyclic_path: &str,
) {
    let id = view.node(child).id.clone();
    let note = options.cyclic_note.resolve(&id, || {
        "This entity depends on another entity that already appears further up the branch. \
         No more entities are shown here to prevent an infinite loop."
            .to_string()
    });

    let mut clone = view.node(child).copy_without_deps();
    clone.kind = NodeKind::CyclicClone;
    clone.note = Some(note);
    clone.cyclic_paths = vec![cyclic_path.to_string()];
    substitute(view, log, parent, index, child, clone);
}

fn substitute_max_depth(
    view: &mut View,
    log: &mut SubstitutionLog,
    options: &Options,
    parent: NodeId,
    index: usize,
    child: NodeId,
) {
    let id = view.node(child).id.clone();
    let limit = options.max_depth;
    let note = options.max_depth_note.resolve(&id, || {
        format!(
            "Maximum depth of {limit} entities reached. This entity has more dependencies, \
             but they cannot be shown here. Set this entity as the root to view them."
        )
    });

    let mut clone = view.node(child).copy_without_deps();
    clone.kind = NodeKind::MaxDepthClone;
    clone.note = Some(note);
    substitute(view, log, parent, index, child, clone);
}

fn substitute(
    view: &mut View,
    log: &mut SubstitutionLog,
    parent: NodeId,
    index: usize,
    original: NodeId,
    clone: Node,
) {
    let clone_handle = view.push_clone(clone);
    if let Some(deps) = view.node_mut(parent).deps.as_mut() {
        deps[index] = DepSlot::Handle(clone_handle);
    }
    log.push(Substitution {
        parent,
        index,
        original,
    });
}

/// Undo every substitution in reverse order and discard the clone nodes past
/// the pre-walk watermark. A no-op when the log is already empty.
pub(crate) fn restore(view: &mut View, log: &mut SubstitutionLog, watermark: usize) {
    while let Some(substitution) = log.pop() {
        if let Some(deps) = view.node_mut(substitution.parent).deps.as_mut() {
            deps[substitution.index] = DepSlot::Handle(substitution.original);
        }
    }
    view.truncate(watermark);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Direction, Session};
    use proptest::prelude::*;
    use serde_json::json;

    fn session(data: serde_json::Value) -> Session {
        let mut session = Session::new();
        session.ingest(data).expect("valid fixture");
        session
    }

    fn child_kinds(session: &Session) -> Vec<(String, NodeKind)> {
        let root = session.tree_root().expect("tree is set");
        root.deps()
            .map(|child| (child.id().to_string(), child.kind()))
            .collect()
    }

    #[test]
    fn cycle_wins_over_depth_limit() {
        // The a -> a edge is both a cycle point and at the depth limit; the
        // cycle check runs first, so it is labeled cyclic, never max depth.
        let mut session = Session::with_options(crate::options::Options {
            max_depth: 1,
            ..Default::default()
        });
        session
            .ingest(json!([
                { "id": "a", "deps": ["b", "a"] },
                { "id": "b", "deps": ["d"] }
            ]))
            .expect("valid fixture");

        session.set_tree("a", Direction::Upstream).expect("root exists");
        assert_eq!(
            child_kinds(&session),
            vec![
                ("b".to_string(), NodeKind::MaxDepthClone),
                ("a".to_string(), NodeKind::CyclicClone),
            ]
        );
        let root = session.tree_root().expect("tree is set");
        let cyclic = root.deps().nth(1).expect("repeated a edge");
        assert_eq!(cyclic.cyclic_paths(), ["a → a"]);
    }

    #[test]
    fn full_cycle_is_cut_at_the_closing_edge() {
        let mut session = session(json!([
            { "id": "rock", "deps": ["paper"] },
            { "id": "paper", "deps": ["scissors"] },
            { "id": "scissors", "deps": ["rock"] }
        ]));
        session
            .set_tree("rock", Direction::Upstream)
            .expect("root exists");

        let root = session.tree_root().expect("tree is set");
        let paper = root.deps().next().expect("rock depends on paper");
        let scissors = paper.deps().next().expect("paper depends on scissors");
        let clone = scissors.deps().next().expect("scissors points back at rock");

        assert_eq!(paper.kind(), NodeKind::Entity);
        assert_eq!(scissors.kind(), NodeKind::Entity);
        assert_eq!(clone.kind(), NodeKind::CyclicClone);
        assert_eq!(clone.id(), "rock");
        assert_eq!(clone.cyclic_paths(), ["rock → paper → scissors → rock"]);
        assert!(!clone.has_deps());
    }

    #[test]
    fn missing_entities_are_never_depth_truncated() {
        let mut session = Session::with_options(crate::options::Options {
            max_depth: 1,
            ..Default::default()
        });
        session
            .ingest(json!([
                { "id": "a", "deps": ["b", "ghost"] },
                { "id": "b", "deps": ["c"] }
            ]))
            .expect("valid fixture");
        session.set_tree("a", Direction::Upstream).expect("root exists");

        let kinds = child_kinds(&session);
        assert_eq!(
            kinds,
            vec![
                ("b".to_string(), NodeKind::MaxDepthClone),
                ("ghost".to_string(), NodeKind::Missing),
            ]
        );
    }

    #[test]
    fn leaves_are_never_depth_truncated() {
        let mut session = Session::with_options(crate::options::Options {
            max_depth: 1,
            ..Default::default()
        });
        session
            .ingest(json!([
                { "id": "a", "deps": ["leaf"] },
                { "id": "leaf" }
            ]))
            .expect("valid fixture");
        session.set_tree("a", Direction::Upstream).expect("root exists");
        assert_eq!(
            child_kinds(&session),
            vec![("leaf".to_string(), NodeKind::Entity)]
        );
    }

    #[test]
    fn diamond_paths_are_not_cycles() {
        let mut session = session(json!([
            { "id": "root", "deps": ["left", "right"] },
            { "id": "left", "deps": ["shared"] },
            { "id": "right", "deps": ["shared"] },
            { "id": "shared" }
        ]));
        session
            .set_tree("root", Direction::Upstream)
            .expect("root exists");

        let root = session.tree_root().expect("tree is set");
        for branch in root.deps() {
            let shared = branch.deps().next().expect("branch reaches shared");
            assert_eq!(shared.kind(), NodeKind::Entity);
        }
    }

    #[test]
    fn self_loop_is_cyclic_with_minimal_path() {
        let mut session = session(json!([{ "id": "a", "deps": ["a"] }]));
        session.set_tree("a", Direction::Upstream).expect("root exists");
        let root = session.tree_root().expect("tree is set");
        let clone = root.deps().next().expect("self edge");
        assert_eq!(clone.kind(), NodeKind::CyclicClone);
        assert_eq!(clone.cyclic_paths(), ["a → a"]);
    }

    #[test]
    fn restore_is_idempotent_on_an_empty_log() {
        let mut session = session(json!([{ "id": "a", "deps": ["b"] }]));
        let before = session.upstream.clone();
        session.restore();
        session.restore();
        assert_eq!(session.upstream, before);
    }

    #[test]
    fn restore_recovers_exact_structure_after_cyclic_walk() {
        let mut session = session(json!([
            { "id": "rock", "deps": ["scissors"] },
            { "id": "scissors", "deps": ["paper"] },
            { "id": "paper", "deps": ["rock"] }
        ]));
        let upstream_before = session.upstream.clone();
        let downstream_before = session.downstream.clone();

        session
            .set_tree("rock", Direction::Upstream)
            .expect("root exists");
        session.restore();

        assert_eq!(session.upstream, upstream_before);
        assert_eq!(session.downstream, downstream_before);
    }

    proptest! {
        /// Materialize-then-restore leaves both views structurally identical
        /// for arbitrary graphs (cycles, diamonds, duplicates, self-loops),
        /// any root, either direction, and any small depth bound.
        #[test]
        fn materialize_then_restore_is_identity(
            edges in prop::collection::vec((0usize..8, 0usize..8), 0..24),
            root in 0usize..8,
            max_depth in 1usize..6,
            downstream in proptest::bool::ANY,
        ) {
            let entities: Vec<serde_json::Value> = (0..8)
                .map(|n| {
                    let deps: Vec<String> = edges
                        .iter()
                        .filter(|(from, _)| *from == n)
                        .map(|(_, to)| format!("n{to}"))
                        .collect();
                    json!({ "id": format!("n{n}"), "deps": deps })
                })
                .collect();

            let mut session = Session::with_options(crate::options::Options {
                max_depth,
                ..Default::default()
            });
            session.ingest(json!(entities)).expect("generated input is valid");

            let upstream_before = session.upstream.clone();
            let downstream_before = session.downstream.clone();

            let direction = if downstream {
                Direction::Downstream
            } else {
                Direction::Upstream
            };
            session
                .set_tree(&format!("n{root}"), direction)
                .expect("all roots are declared");
            session.restore();

            prop_assert_eq!(&session.upstream, &upstream_before);
            prop_assert_eq!(&session.downstream, &downstream_before);
        }
    }
}
