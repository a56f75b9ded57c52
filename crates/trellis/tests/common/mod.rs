//! Common test fixtures shared across integration tests.

use serde_json::{Value, json};
use trellis::Session;

/// A clean acyclic fixture: a royal family tree with display attributes.
///
/// `deps` point at ancestors, so the upstream view walks toward
/// grandparents and the downstream view walks toward descendants.
pub fn royals() -> Value {
    json!([
        { "id": "George",    "deps": ["Charlotte", "William"], "role": "Prince" },
        { "id": "Charlotte", "deps": [],                        "role": "Princess" },
        { "id": "William",   "deps": ["Diana", "Charles"],      "role": "Prince" },
        { "id": "Diana",     "deps": [],                        "role": "Princess" },
        { "id": "Charles",   "deps": ["Elizabeth"],             "role": "King" },
        { "id": "Elizabeth", "deps": [],                        "role": "Queen" }
    ])
}

/// A deliberately messy fixture: a three-way cycle, a duplicate
/// declaration, and references to entities that are never declared.
pub fn rock_paper_scissors() -> Value {
    json!([
        { "id": "rock",     "deps": ["paper", "guu", "paper"] },
        { "id": "paper",    "deps": ["scissors", "paa"] },
        { "id": "scissors", "deps": ["rock", "choki"] }
    ])
}

/// Ingest a fixture into a fresh session with default options.
pub fn session_with(data: Value) -> Session {
    let mut session = Session::new();
    session.ingest(data).expect("fixture ingests cleanly");
    session
}
