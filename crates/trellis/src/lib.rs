//! Trellis - a dependency-graph engine with bounded, cycle-safe tree views.
//!
//! This crate ingests named entities that declare dependencies on each other
//! by id, links them into mirrored upstream/downstream adjacency views, and
//! materializes finite, acyclic, renderable trees rooted at any entity,
//! even when the underlying graph contains cycles, diamonds, or references
//! to entities that were never declared. Imperfect graphs are rendered, not
//! rejected: placeholders, cycle cuts, and depth cuts all surface as visibly
//! annotated nodes, and a consistency report lists every soft finding.
//!
//! The library is the engine plus a terminal renderer; the binary wires them
//! into a small CLI over JSON entity files.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod engine;
pub mod error;
pub mod options;
pub mod output;

// Public CLI module (needed by binary)
pub mod cli;

pub use engine::{Direction, DuplicateEdge, NodeKind, NodeRef, Report, Session};
pub use error::{Error, Result};
pub use options::{NoteTemplate, Options};
