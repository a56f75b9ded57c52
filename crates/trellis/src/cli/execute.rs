//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::args::{CheckArgs, ListArgs, ShowArgs};
use super::config::FileConfig;
use crate::engine::Session;
use crate::options::Options;
use crate::output::color::{bold, error, success};
use crate::output::tree::print_tree;
use crate::output::{OutputConfig, OutputMode};

/// Read an entity file and build a linked session out of it.
fn load_session(path: &Path, options: Options) -> Result<Session> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read entity file {}", path.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let mut session = Session::with_options(options);
    session
        .ingest(data)
        .with_context(|| format!("failed to ingest {}", path.display()))?;
    Ok(session)
}

/// Execute the show command
pub fn execute_show(args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let config = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };
    let options = config.into_options(args.max_depth);

    let mut session = load_session(&args.file, options)?;
    let root = session.set_tree(&args.root, args.direction.into())?;
    print_tree(root, output_mode)?;
    Ok(())
}

/// Execute the check command
pub fn execute_check(args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let mut session = load_session(&args.file, Options::default())?;
    let report = session.report()?;

    match output_mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let verdict = |clean: bool| {
                if clean {
                    success("ok", &config)
                } else {
                    error("FAIL", &config)
                }
            };

            println!("{}", bold("Consistency report", &config));
            println!(
                "duplicate dependencies  {}",
                verdict(report.no_duplicate_dependencies)
            );
            for duplicate in &report.duplicate_dependencies {
                println!("  {duplicate}");
            }
            println!(
                "missing entities        {}",
                verdict(report.no_missing_entities)
            );
            for id in &report.missing_entities {
                println!("  {id}");
            }
            println!("cycles                  {}", verdict(report.no_cycles));
            for cycle in &report.cycles {
                println!("  {}", cycle.join(", "));
            }
        }
    }

    if !report.is_clean() && !args.allow_findings {
        bail!("consistency check found problems");
    }
    Ok(())
}

/// Execute the list command
pub fn execute_list(args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let mut session = load_session(&args.file, Options::default())?;
    let ids = session.get_entity_list(args.key.as_deref(), args.value.as_deref());

    match output_mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(ids.as_ref())?);
        }
        OutputMode::Text => {
            for id in ids.iter() {
                println!("{id}");
            }
        }
    }
    Ok(())
}
