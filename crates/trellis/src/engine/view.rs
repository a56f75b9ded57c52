//! Arena-backed node storage for one adjacency view.
//!
//! Each view (upstream, downstream) owns its nodes in a `Vec` arena plus an
//! id-to-index map. Dependency lists hold [`DepSlot`] values: id strings
//! before linking, stable arena handles after. A clone substitution during
//! materialization is then an O(1) slot overwrite recorded in the
//! substitution log, and clones themselves are appended past a watermark so
//! restore can truncate them away.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Index of a node within one view's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// What a node in a view represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Declared by the input data.
    Entity,

    /// Referenced but never declared; synthesized during linking.
    Missing,

    /// Ephemeral substitute cutting a cycle during one materialization pass.
    CyclicClone,

    /// Ephemeral substitute capping traversal depth.
    MaxDepthClone,
}

impl NodeKind {
    /// Whether this node is an ephemeral clone rather than a session entity.
    #[must_use]
    pub fn is_clone(self) -> bool {
        matches!(self, Self::CyclicClone | Self::MaxDepthClone)
    }

    /// Short lowercase label used in rendered output.
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Entity => None,
            Self::Missing => Some("missing"),
            Self::CyclicClone => Some("cyclic"),
            Self::MaxDepthClone => Some("max depth"),
        }
    }
}

/// One dependency slot: an id before linking, an arena handle after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DepSlot {
    Name(String),
    Handle(NodeId),
}

impl DepSlot {
    /// The handle form of a linked slot.
    ///
    /// Linking replaces every `Name` with a `Handle`; materialization and
    /// export only run on linked views.
    pub(crate) fn handle(&self) -> Option<NodeId> {
        match self {
            Self::Handle(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

/// A single entity (or clone) inside one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) id: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) kind: NodeKind,
    pub(crate) note: Option<String>,
    /// Accumulated full-path strings; non-empty only on cyclic clones.
    pub(crate) cyclic_paths: Vec<String>,
    /// `None` means leaf. Clones never own a deps list.
    pub(crate) deps: Option<Vec<DepSlot>>,
}

impl Node {
    pub(crate) fn new(
        id: String,
        attributes: BTreeMap<String, String>,
        deps: Option<Vec<String>>,
    ) -> Self {
        Self {
            id,
            attributes,
            kind: NodeKind::Entity,
            note: None,
            cyclic_paths: Vec::new(),
            deps: deps.map(|names| names.into_iter().map(DepSlot::Name).collect()),
        }
    }

    /// Shallow copy carrying everything but the deps list.
    ///
    /// Used for downstream twins of upstream nodes and as the base of clone
    /// nodes; the missing flag and note travel with the copy.
    pub(crate) fn copy_without_deps(&self) -> Self {
        Self {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            kind: self.kind,
            note: self.note.clone(),
            cyclic_paths: Vec::new(),
            deps: None,
        }
    }

    pub(crate) fn dep_count(&self) -> usize {
        self.deps.as_ref().map_or(0, Vec::len)
    }
}

/// One adjacency view: an arena of nodes plus an id index.
///
/// Exactly one indexed node exists per id. Clone nodes appended during
/// materialization share their original's id and are deliberately kept out of
/// the index; they are reachable only through substituted dependency slots.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct View {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl View {
    /// Insert a new indexed node, failing on an id collision.
    pub(crate) fn insert(&mut self, node: Node) -> Result<NodeId> {
        if self.index.contains_key(&node.id) {
            return Err(Error::DuplicateId(node.id));
        }
        Ok(self.insert_unchecked(node))
    }

    /// Insert a node known to be absent, or return the existing handle.
    pub(crate) fn ensure(&mut self, node: Node) -> NodeId {
        match self.index.get(&node.id) {
            Some(&handle) => handle,
            None => self.insert_unchecked(node),
        }
    }

    fn insert_unchecked(&mut self, node: Node) -> NodeId {
        let handle = NodeId(self.nodes.len());
        self.index.insert(node.id.clone(), handle);
        self.nodes.push(node);
        handle
    }

    /// Append an ephemeral clone without touching the id index.
    pub(crate) fn push_clone(&mut self, node: Node) -> NodeId {
        let handle = NodeId(self.nodes.len());
        self.nodes.push(node);
        handle
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub(crate) fn node(&self, handle: NodeId) -> &Node {
        &self.nodes[handle.0]
    }

    pub(crate) fn node_mut(&mut self, handle: NodeId) -> &mut Node {
        &mut self.nodes[handle.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Drop everything past `len`; used by restore to discard clones.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Handles of all indexed (non-clone) nodes in insertion order.
    pub(crate) fn handles(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.kind.is_clone())
            .map(|(i, _)| NodeId(i))
    }
}

/// Borrowed, read-only handle to a node in a materialized view.
///
/// This is the interface a rendering collaborator consumes: node data plus
/// children resolvable through [`NodeRef::deps`]. The engine computes no
/// layout of its own.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) view: &'a View,
    pub(crate) handle: NodeId,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        self.view.node(self.handle)
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.node().id
    }

    /// What this node represents.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    /// Opaque display attributes carried through from the input record.
    #[must_use]
    pub fn attributes(&self) -> &'a BTreeMap<String, String> {
        &self.node().attributes
    }

    /// Automated annotation, present on missing entities and clones.
    #[must_use]
    pub fn note(&self) -> Option<&'a str> {
        self.node().note.as_deref()
    }

    /// Full path strings that reached this cycle point; empty unless this is
    /// a cyclic clone.
    #[must_use]
    pub fn cyclic_paths(&self) -> &'a [String] {
        &self.node().cyclic_paths
    }

    /// Whether this node has any dependencies in the current view.
    #[must_use]
    pub fn has_deps(&self) -> bool {
        self.node().dep_count() > 0
    }

    /// Children of this node, in declaration order.
    pub fn deps(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let view = self.view;
        self.node()
            .deps
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(move |slot| {
                slot.handle().map(|handle| NodeRef { view, handle })
            })
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
