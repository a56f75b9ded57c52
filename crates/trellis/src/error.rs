//! Error types for trellis operations.
//!
//! Hard failures (bad input shape, misuse of the session lifecycle, bad
//! lookups) are errors. Soft findings (duplicate edges, missing entities,
//! cycles) are never errors: they are recorded during linking and surfaced
//! through [`crate::engine::Session::report`] and as visible annotations on
//! the materialized tree, because dependency graphs in the wild are expected
//! to be imperfect and the job is to render them anyway.

use std::io;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw input record is not a key-value object.
    #[error("entity{} is not a key-value record: received `{got}`", fmt_context(.context))]
    Shape {
        /// Map key the record was found under, if ingesting the mapping form.
        context: Option<String>,
        /// Display rendering of the offending value.
        got: String,
    },

    /// An entity's own `id` is missing, not a string, or empty.
    #[error("entity \"id\" must be a non-empty string: received `{got}`")]
    EntityName {
        /// Display rendering of the offending value.
        got: String,
    },

    /// A dependency id inside an entity's `deps` list is invalid or empty.
    #[error("entity \"{parent}\" declares a dependency id that is not a non-empty string: received `{got}`")]
    DependencyName {
        /// Id of the entity whose `deps` list holds the bad value.
        parent: String,
        /// Display rendering of the offending value.
        got: String,
    },

    /// An entity's `deps` key is present but not an array or null.
    #[error("\"deps\" in entity \"{id}\" must be an array, null, or absent: received `{got}`")]
    DepsType {
        /// Id of the entity carrying the bad `deps` value.
        id: String,
        /// Display rendering of the offending value.
        got: String,
    },

    /// The same id appears twice in sequence-form input.
    #[error("entity \"{0}\" is duplicated in the input data; every entity needs a unique id")]
    DuplicateId(String),

    /// `ingest` was called a second time on the same session.
    #[error("entities have already been ingested; create a new session to load other data")]
    AlreadyIngested,

    /// A whole-graph operation was requested before ingestion completed.
    #[error("entities have not been ingested yet; call ingest first")]
    NotIngested,

    /// The requested entity id is absent from the chosen view.
    #[error("entity \"{0}\" was not found")]
    NotFound(String),

    /// A direction string was neither `upstream` nor `downstream`.
    #[error("direction must be \"upstream\" or \"downstream\": received \"{0}\"")]
    InvalidDirection(String),

    /// Structural export reached an entity already on its own path.
    #[error("cyclic structure: entity \"{0}\" depends on itself through the graph")]
    Cyclic(String),

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input data was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_context(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|key| format!(" \"{key}\""))
        .unwrap_or_default()
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
