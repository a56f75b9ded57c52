//! The dependency-graph engine.
//!
//! A [`Session`] ingests a list of named entities once, links them into two
//! mirrored adjacency views (upstream: what I depend on; downstream: what
//! depends on me), and then materializes bounded, acyclic tree views rooted
//! at any entity on demand. The underlying graph may contain cycles,
//! diamonds, and dangling references; materialization substitutes ephemeral
//! clone nodes at cycle points and at the depth limit, and restoring undoes
//! every substitution exactly.
//!
//! # Lifecycle
//!
//! 1. [`Session::ingest`]: validate, populate, and link. One-shot.
//! 2. [`Session::set_tree`]: restore any prior pass, then materialize a new
//!    root. The returned [`NodeRef`] resolves children through its `deps`
//!    accessor; layout and drawing belong to the caller.
//! 3. [`Session::restore`]: undo the open pass. Also forced by `set_tree`
//!    and [`Session::report`].
//!
//! # Thread safety
//!
//! The engine is single-threaded and synchronous; every mutating operation
//! takes `&mut self`, so the ingest-once and materialize/restore discipline
//! is enforced by ownership. Hosts that share a session across threads must
//! wrap it in a `Mutex` (there is no interior locking).

mod link;
mod materialize;
mod report;
mod validate;
mod view;

pub use link::DuplicateEdge;
pub use report::Report;
pub use view::{NodeKind, NodeRef};

use crate::error::{Error, Result};
use crate::options::Options;
use materialize::SubstitutionLog;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use view::{NodeId, View};

/// Which adjacency direction a tree is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow dependencies: what the root depends on.
    Upstream,
    /// Follow dependents: what depends on the root.
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upstream" => Ok(Self::Upstream),
            "downstream" => Ok(Self::Downstream),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// An open materialization pass.
#[derive(Debug, Clone, Copy)]
struct ActiveTree {
    root: NodeId,
    direction: Direction,
    /// Arena length before the pass; clones live past this point.
    watermark: usize,
}

/// One in-memory dependency graph, built once per session.
pub struct Session {
    options: Options,
    pub(crate) upstream: View,
    pub(crate) downstream: View,
    ingested: bool,
    missing_entities: Vec<String>,
    duplicate_edges: Vec<DuplicateEdge>,
    log: SubstitutionLog,
    active: Option<ActiveTree>,
    list_memo: HashMap<(Option<String>, Option<String>), Arc<Vec<String>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("ingested", &self.ingested)
            .field("entities", &self.upstream.len())
            .field("missing", &self.missing_entities.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty session with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create an empty session with explicit options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            upstream: View::default(),
            downstream: View::default(),
            ingested: false,
            missing_entities: Vec::new(),
            duplicate_edges: Vec::new(),
            log: SubstitutionLog::new(),
            active: None,
            list_memo: HashMap::new(),
        }
    }

    /// Ingest raw entity records and link the graph. One-shot per session.
    ///
    /// Accepts a JSON array of records or a pre-keyed object mapping id to
    /// record. On a validation error the session should be discarded; the
    /// ingested flag is only set once linking completes.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyIngested`] on reuse, and the validation taxonomy
    /// (`Shape`, `EntityName`, `DependencyName`, `DepsType`, `DuplicateId`)
    /// on bad input.
    pub fn ingest(&mut self, data: Value) -> Result<()> {
        if self.ingested {
            return Err(Error::AlreadyIngested);
        }
        link::populate_upstream(&mut self.upstream, &data)?;
        link::link(
            &mut self.upstream,
            &mut self.downstream,
            &self.options,
            &mut self.missing_entities,
            &mut self.duplicate_edges,
        );
        self.ingested = true;
        tracing::debug!(
            entities = self.upstream.len(),
            missing = self.missing_entities.len(),
            duplicates = self.duplicate_edges.len(),
            "ingested and linked entity graph"
        );
        Ok(())
    }

    /// All entity ids, or the ids whose `key` attribute equals `value`.
    ///
    /// Results are memoized per `(key, value)` pair for the session's
    /// lifetime; the graph is immutable after ingestion, so the cache is
    /// never invalidated. Repeat calls return the same allocation.
    pub fn get_entity_list(&mut self, key: Option<&str>, value: Option<&str>) -> Arc<Vec<String>> {
        let memo_key = (key.map(str::to_owned), value.map(str::to_owned));
        if let Some(hit) = self.list_memo.get(&memo_key) {
            return Arc::clone(hit);
        }

        let list: Vec<String> = match (key, value) {
            (Some(key), Some(value)) => self
                .upstream
                .handles()
                .filter(|&h| {
                    self.upstream
                        .node(h)
                        .attributes
                        .get(key)
                        .is_some_and(|v| v == value)
                })
                .map(|h| self.upstream.node(h).id.clone())
                .collect(),
            _ => self
                .upstream
                .handles()
                .map(|h| self.upstream.node(h).id.clone())
                .collect(),
        };

        let list = Arc::new(list);
        self.list_memo.insert(memo_key, Arc::clone(&list));
        list
    }

    /// Materialize a bounded tree rooted at `id` over the chosen direction.
    ///
    /// Any previously open pass is restored first. The returned reference is
    /// the root of the materialized tree; its children resolve through
    /// [`NodeRef::deps`].
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` is absent from that view.
    pub fn set_tree(&mut self, id: &str, direction: Direction) -> Result<NodeRef<'_>> {
        let root = self
            .view(direction)
            .lookup(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        self.restore();
        let watermark = self.view(direction).len();
        let view = match direction {
            Direction::Upstream => &mut self.upstream,
            Direction::Downstream => &mut self.downstream,
        };
        materialize::materialize(view, &self.options, &mut self.log, root);
        self.active = Some(ActiveTree {
            root,
            direction,
            watermark,
        });

        Ok(NodeRef {
            view: self.view(direction),
            handle: root,
        })
    }

    /// The root of the currently materialized tree, if a pass is open.
    #[must_use]
    pub fn tree_root(&self) -> Option<NodeRef<'_>> {
        self.active.map(|active| NodeRef {
            view: self.view(active.direction),
            handle: active.root,
        })
    }

    /// Undo the open materialization pass, restoring the graph to its
    /// pre-traversal state. A no-op when nothing is open.
    pub fn restore(&mut self) {
        if let Some(active) = self.active.take() {
            let view = match active.direction {
                Direction::Upstream => &mut self.upstream,
                Direction::Downstream => &mut self.downstream,
            };
            materialize::restore(view, &mut self.log, active.watermark);
        }
        debug_assert!(self.log.is_empty());
    }

    /// Run the consistency check over the whole graph.
    ///
    /// Forces [`Session::restore`] first so stale clones cannot bias the
    /// findings. Acyclicity is determined by attempting the full structural
    /// export of the upstream view.
    ///
    /// # Errors
    ///
    /// [`Error::NotIngested`] if ingestion has not completed.
    pub fn report(&mut self) -> Result<Report> {
        if !self.ingested {
            return Err(Error::NotIngested);
        }
        self.restore();

        let no_cycles = report::export(&self.upstream).is_ok();
        let cycles = if no_cycles {
            Vec::new()
        } else {
            report::find_cycles(&self.upstream)
        };

        Ok(Report {
            no_duplicate_dependencies: self.duplicate_edges.is_empty(),
            no_missing_entities: self.missing_entities.is_empty(),
            no_cycles,
            duplicate_dependencies: self.duplicate_edges.clone(),
            missing_entities: self.missing_entities.clone(),
            cycles,
        })
    }

    /// Export the upstream view as JSON, dependencies embedded recursively.
    ///
    /// Callers must restore any open materialization first; clones are not
    /// part of the canonical graph.
    ///
    /// # Errors
    ///
    /// [`Error::Cyclic`] if the graph contains a cycle.
    pub fn to_json(&self) -> Result<Value> {
        report::export(&self.upstream)
    }

    fn view(&self, direction: Direction) -> &View {
        match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direction_parses_and_rejects() {
        assert_eq!("upstream".parse::<Direction>().ok(), Some(Direction::Upstream));
        assert_eq!(
            "downstream".parse::<Direction>().ok(),
            Some(Direction::Downstream)
        );
        let err = "sideways".parse::<Direction>().expect_err("invalid");
        assert!(matches!(err, Error::InvalidDirection(d) if d == "sideways"));
    }

    #[test]
    fn ingest_twice_fails() {
        let mut session = Session::new();
        session.ingest(json!([{ "id": "a" }])).expect("first ingest");
        let err = session.ingest(json!([{ "id": "b" }])).expect_err("reuse");
        assert!(matches!(err, Error::AlreadyIngested));
    }

    #[test]
    fn report_before_ingest_fails() {
        let mut session = Session::new();
        let err = session.report().expect_err("not ingested");
        assert!(matches!(err, Error::NotIngested));
    }

    #[test]
    fn set_tree_unknown_root_fails() {
        let mut session = Session::new();
        session.ingest(json!([{ "id": "a" }])).expect("ingest");
        let err = session
            .set_tree("nope", Direction::Upstream)
            .expect_err("unknown root");
        assert!(matches!(err, Error::NotFound(id) if id == "nope"));
    }

    #[test]
    fn set_tree_restores_the_previous_pass() {
        let mut session = Session::new();
        session
            .ingest(json!([
                { "id": "a", "deps": ["b"] },
                { "id": "b", "deps": ["a"] }
            ]))
            .expect("ingest");

        let before = session.upstream.clone();
        session.set_tree("a", Direction::Upstream).expect("first tree");
        // Switching roots must fully undo the first pass before walking.
        session.set_tree("b", Direction::Downstream).expect("second tree");
        session.restore();
        assert_eq!(session.upstream, before);
    }

    #[test]
    fn report_closes_an_open_pass() {
        let mut session = Session::new();
        session
            .ingest(json!([
                { "id": "a", "deps": ["b"] },
                { "id": "b" }
            ]))
            .expect("ingest");
        session.set_tree("a", Direction::Upstream).expect("tree");
        let report = session.report().expect("report succeeds");
        assert!(report.is_clean());
        assert!(session.tree_root().is_none());
    }
}
