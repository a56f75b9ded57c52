//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for trellis using clap's
//! derive API. Each command has its own argument struct.
//!
//! # Commands
//!
//! - `show`: Materialize and render a dependency tree rooted at an entity
//! - `check`: Run the whole-graph consistency report
//! - `list`: List entity ids, optionally filtered by an attribute
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis show services.json web --direction downstream
//! trellis check services.json
//! trellis list services.json --key team --value core
//! ```

mod args;
mod config;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{CheckArgs, DirectionArg, ListArgs, ShowArgs};
pub use config::FileConfig;

/// Trellis - bounded, cycle-safe dependency tree views
///
/// Reads a JSON file of entities that name their dependencies by id, links
/// them into a graph, and renders finite trees from any root, even when the
/// data contains cycles, duplicate declarations, or dangling references.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a dependency tree rooted at an entity
    ///
    /// Walks upstream (what the root depends on) or downstream (what depends
    /// on the root). Cycles and over-deep branches are cut and annotated
    /// instead of looping or flooding the terminal.
    Show(ShowArgs),

    /// Check the graph for duplicate, missing, and cyclic dependencies
    ///
    /// Findings are printed but never abort the read; the exit status is
    /// non-zero when any finding is present unless `--allow-findings` is set.
    Check(CheckArgs),

    /// List entity ids
    ///
    /// With `--key` and `--value`, lists only the entities whose attribute
    /// matches.
    List(ListArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap parse error verbatim.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Propagates command failures; the binary maps these to a non-zero exit.
    pub fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Show(args)) => execute::execute_show(args, output_mode),
            Some(Commands::Check(args)) => execute::execute_check(args, output_mode),
            Some(Commands::List(args)) => execute::execute_list(args, output_mode),
            None => {
                println!("Trellis dependency tree viewer");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
