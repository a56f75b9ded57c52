//! Session configuration: traversal depth and annotation text.

/// Depth at which materialization truncates a branch unless configured
/// otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// Text source for an automated annotation, resolved once per occurrence.
///
/// Missing entities, cyclic clones, and max-depth clones each carry a short
/// explanatory note. The note can be the built-in text, a fixed string, or a
/// function of the affected entity's id.
#[derive(Debug, Clone, Default)]
pub enum NoteTemplate {
    /// Use the built-in text.
    #[default]
    Default,
    /// Use this string verbatim.
    Fixed(String),
    /// Compute the note from the affected entity's id.
    Compute(fn(&str) -> String),
}

impl NoteTemplate {
    pub(crate) fn resolve(&self, id: &str, default: impl FnOnce() -> String) -> String {
        match self {
            Self::Default => default(),
            Self::Fixed(text) => text.clone(),
            Self::Compute(f) => f(id),
        }
    }
}

/// Tunable behavior of a [`crate::engine::Session`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Depth bound for materialization. Branches that would descend past this
    /// depth are replaced with a max-depth clone.
    pub max_depth: usize,

    /// Annotation for synthesized missing entities.
    pub missing_note: NoteTemplate,

    /// Annotation for cyclic clones.
    pub cyclic_note: NoteTemplate,

    /// Annotation for max-depth clones.
    pub max_depth_note: NoteTemplate,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            missing_note: NoteTemplate::Default,
            cyclic_note: NoteTemplate::Default,
            max_depth_note: NoteTemplate::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_note_wins_over_default() {
        let template = NoteTemplate::Fixed("custom".to_string());
        assert_eq!(template.resolve("x", || "built-in".to_string()), "custom");
    }

    #[test]
    fn computed_note_sees_the_id() {
        let template = NoteTemplate::Compute(|id| format!("missing: {id}"));
        assert_eq!(
            template.resolve("paper", || String::new()),
            "missing: paper"
        );
    }

    #[test]
    fn default_depth_is_twenty_five() {
        assert_eq!(Options::default().max_depth, 25);
    }
}
