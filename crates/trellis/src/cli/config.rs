//! YAML config file support for the CLI.
//!
//! A config file can set the depth limit and override the automated note
//! text for each annotation kind:
//!
//! ```yaml
//! max-depth: 10
//! missing-note: "not declared anywhere"
//! cyclic-note: "cycle cut here"
//! max-depth-note: "too deep to show"
//! ```
//!
//! Notes set here are fixed strings; programmatic callers can install
//! per-entity note callbacks through [`crate::options::NoteTemplate`]
//! directly.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::options::{NoteTemplate, Options};

/// Settings parsed from a YAML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Maximum materialization depth.
    pub max_depth: Option<usize>,
    /// Note attached to synthesized placeholder entities.
    pub missing_note: Option<String>,
    /// Note attached to cycle-cutting clones.
    pub cyclic_note: Option<String>,
    /// Note attached to depth-limit clones.
    pub max_depth_note: Option<String>,
}

impl FileConfig {
    /// Load and parse a YAML config file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::Config`] if it is
    /// not valid YAML or names an unknown key.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_yaml::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Convert into engine options, with an optional depth override from the
    /// command line taking precedence over the file.
    #[must_use]
    pub fn into_options(self, max_depth_override: Option<usize>) -> Options {
        let mut options = Options::default();
        if let Some(depth) = max_depth_override.or(self.max_depth) {
            options.max_depth = depth;
        }
        if let Some(note) = self.missing_note {
            options.missing_note = NoteTemplate::Fixed(note);
        }
        if let Some(note) = self.cyclic_note {
            options.cyclic_note = NoteTemplate::Fixed(note);
        }
        if let Some(note) = self.max_depth_note {
            options.max_depth_note = NoteTemplate::Fixed(note);
        }
        options
    }
}
