//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::engine::Direction;

/// Traversal direction for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    /// Follow dependencies: what the root depends on
    Upstream,
    /// Follow dependents: what depends on the root
    Downstream,
}

impl std::fmt::Display for DirectionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Upstream => Self::Upstream,
            DirectionArg::Downstream => Self::Downstream,
        }
    }
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Entity file (JSON array of records, or an object keyed by id)
    pub file: PathBuf,

    /// Id of the entity to use as the tree root
    pub root: String,

    /// Traversal direction
    #[arg(short, long, value_enum, default_value = "upstream")]
    pub direction: DirectionArg,

    /// Maximum tree depth; deeper branches are cut and annotated
    ///
    /// Overrides the config file value when both are given.
    #[arg(short, long)]
    pub max_depth: Option<usize>,

    /// YAML config file with depth and note settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Entity file (JSON array of records, or an object keyed by id)
    pub file: PathBuf,

    /// Exit successfully even when findings are present
    #[arg(long)]
    pub allow_findings: bool,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Entity file (JSON array of records, or an object keyed by id)
    pub file: PathBuf,

    /// Attribute key to filter by (requires --value)
    #[arg(short, long, requires = "value")]
    pub key: Option<String>,

    /// Attribute value to match (requires --key)
    #[arg(short, long, requires = "key")]
    pub value: Option<String>,
}
