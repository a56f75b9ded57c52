//! Output formatting for the CLI.
//!
//! Submodules:
//! - [`color`]: per-kind color and tag helpers
//! - [`tree`]: materialized-tree rendering with ASCII/Unicode connectors
//!
//! The renderers consume the engine's output exclusively through
//! [`crate::engine::NodeRef`] and its `deps` accessor; no graph internals
//! leak into this layer.

pub mod color;
pub mod tree;

use std::env;

const DEFAULT_MAX_WIDTH: usize = 80;

/// Whether to print human-readable text or JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text with connectors and colors.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Settings controlling how output is formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for note wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a config with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Build a config from the environment.
    ///
    /// Reads:
    /// - `TRELLIS_MAX_WIDTH`: content width; defaults to the terminal width
    ///   or 80 when that cannot be detected
    /// - `TRELLIS_ASCII`: "1" or "true" for ASCII-only connectors
    /// - `NO_COLOR`: any value disables colors (<https://no-color.org/>)
    /// - `TRELLIS_COLOR`: "0" or "false" disables colors
    #[must_use]
    pub fn from_env() -> Self {
        let detected_width = terminal_size::terminal_size()
            .map_or(DEFAULT_MAX_WIDTH, |(w, _)| usize::from(w.0));

        let max_width = match env::var("TRELLIS_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "TRELLIS_MAX_WIDTH",
                        value = %s,
                        default = detected_width,
                        "Invalid value, using default"
                    );
                    detected_width
                }
            },
            _ => detected_width,
        };

        let use_ascii = env::var("TRELLIS_ASCII")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}
