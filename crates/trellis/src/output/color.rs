//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Error/Cycle:    red     (cyclic clones, failed checks)
//!   - Warning/Absent: yellow  (missing entities)
//!   - Accent/Limit:   magenta (max-depth clones)
//!   - Info/Reference: cyan    (the root entity)
//!   - Muted:          dimmed  (connectors, attribute labels, notes)
//!   - Emphasis:       bold    (section headers, kind tags)

use crate::engine::NodeKind;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Color an entity id according to what its node represents.
pub(crate) fn colorize_id(id: &str, kind: NodeKind, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    match kind {
        NodeKind::Entity => id.to_string(),
        NodeKind::Missing => id.yellow().to_string(),
        NodeKind::CyclicClone => id.red().to_string(),
        NodeKind::MaxDepthClone => id.magenta().to_string(),
    }
}

/// Bracketed kind tag shown after annotated nodes, e.g. `[missing]`.
///
/// Plain entities have no tag.
pub(crate) fn kind_tag(kind: NodeKind, config: &OutputConfig) -> String {
    let Some(label) = kind.label() else {
        return String::new();
    };
    let text = format!("[{label}]");
    if !config.use_colors {
        return text;
    }
    match kind {
        NodeKind::Entity => text,
        NodeKind::Missing => text.yellow().bold().to_string(),
        NodeKind::CyclicClone => text.red().bold().to_string(),
        NodeKind::MaxDepthClone => text.magenta().bold().to_string(),
    }
}

/// Apply dimmed style to text (for connectors/attribute labels/notes).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    #[test]
    fn colors_off_passes_text_through() {
        let config = plain();
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(colorize_id("web", NodeKind::Missing, &config), "web");
        assert_eq!(kind_tag(NodeKind::CyclicClone, &config), "[cyclic]");
    }

    #[test]
    fn plain_entities_carry_no_tag() {
        let config = plain();
        assert_eq!(kind_tag(NodeKind::Entity, &config), "");
    }
}
