//! Materialized-tree rendering for `trellis show` output.

use std::io::{self, Write};

use colored::Colorize;

use super::color::{colorize_id, dimmed, kind_tag};
use super::{OutputConfig, OutputMode};
use crate::engine::NodeRef;

/// Minimum wrap width for notes once connector prefixes are subtracted.
const MIN_NOTE_WIDTH: usize = 24;

/// Print a materialized tree with ASCII/Unicode connectors.
///
/// Renders a tree like:
/// ```text
/// ◆ web
/// ├── api
/// │   └── db
/// └── cache [missing]
///         "cache" was not found in the input entity list ...
/// ```
pub fn print_tree(root: NodeRef<'_>, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => render_tree_text(&mut handle, root, &config),
        OutputMode::Json => {
            let json = tree_to_json(root);
            let output = serde_json::to_string_pretty(&json).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
    }
}

/// Render the materialized tree with ASCII art connectors.
pub fn render_tree_text<W: Write>(
    w: &mut W,
    root: NodeRef<'_>,
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon_str = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };

    writeln!(
        w,
        "{} {}{}",
        root_icon_str,
        colorize_id(root.id(), root.kind(), config),
        tag_suffix(root, config)
    )?;
    render_annotations(w, root, "  ", 2, config)?;

    let children: Vec<NodeRef<'_>> = root.deps().collect();
    render_children(w, &children, &[], config)
}

/// Recursively render tree children with proper connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below,
/// used to draw the vertical continuation lines (`│`).
fn render_children<W: Write>(
    w: &mut W,
    children: &[NodeRef<'_>],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;

        // Build prefix from ancestor continuation lines
        let mut prefix = String::new();
        for &has_more in prefix_segments {
            let segment = if has_more { pipe } else { space };
            prefix.push_str(&dimmed(segment, config));
        }

        let connector = if is_last { corner } else { branch };

        writeln!(
            w,
            "{}{}{}{}",
            prefix,
            dimmed(connector, config),
            colorize_id(child.id(), child.kind(), config),
            tag_suffix(*child, config)
        )?;

        // Notes and cycle paths continue under the child's own column.
        let continuation = format!(
            "{prefix}{}",
            dimmed(if is_last { space } else { pipe }, config)
        );
        let continuation_cols = (prefix_segments.len() + 1) * 4;
        render_annotations(w, *child, &continuation, continuation_cols, config)?;

        let grandchildren: Vec<NodeRef<'_>> = child.deps().collect();
        if !grandchildren.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            render_children(w, &grandchildren, &next_segments, config)?;
        }
    }

    Ok(())
}

/// Attributes and the kind tag rendered after the id.
fn tag_suffix(node: NodeRef<'_>, config: &OutputConfig) -> String {
    let mut suffix = String::new();
    if !node.attributes().is_empty() {
        let attrs = node
            .attributes()
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        suffix.push(' ');
        suffix.push_str(&dimmed(&format!("({attrs})"), config));
    }
    let tag = kind_tag(node.kind(), config);
    if !tag.is_empty() {
        suffix.push(' ');
        suffix.push_str(&tag);
    }
    suffix
}

/// Print a node's note (wrapped) and its cycle paths below the node line.
fn render_annotations<W: Write>(
    w: &mut W,
    node: NodeRef<'_>,
    prefix: &str,
    prefix_cols: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if let Some(note) = node.note() {
        let width = config
            .max_width
            .saturating_sub(prefix_cols)
            .max(MIN_NOTE_WIDTH);
        for line in textwrap::wrap(note, width) {
            writeln!(w, "{prefix}{}", dimmed(&line, config))?;
        }
    }
    for path in node.cyclic_paths() {
        writeln!(w, "{prefix}{}", dimmed(path, config))?;
    }
    Ok(())
}

/// Convert a materialized tree to a JSON value for programmatic output.
pub fn tree_to_json(node: NodeRef<'_>) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "id": node.id(),
    });

    if let Some(label) = node.kind().label() {
        obj["kind"] = serde_json::json!(label);
    }
    if let Some(note) = node.note() {
        obj["note"] = serde_json::json!(note);
    }
    if !node.attributes().is_empty() {
        obj["attributes"] = serde_json::json!(node.attributes());
    }
    if !node.cyclic_paths().is_empty() {
        obj["cyclic_paths"] = serde_json::json!(node.cyclic_paths());
    }
    if node.has_deps() {
        obj["deps"] = serde_json::json!(node.deps().map(tree_to_json).collect::<Vec<_>>());
    }

    obj
}
