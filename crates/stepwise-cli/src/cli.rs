//! CLI argument definitions for Stepwise.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stepwise_core::version::Version;

#[derive(Parser, Debug)]
#[command(
    name = "stepwise",
    version,
    about = "Order versioned units across namespaces",
    long_about = "Stepwise validates a set of versioned units (migrations, schema changes, \
                  upgrade steps) spread over several namespaces and computes the order in \
                  which they must be applied to move from one state to another."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to Stepwise.toml (default: search upwards from the current directory)
    #[arg(long, global = true, env = "STEPWISE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the manifest: namespaces, dependencies and cycles
    Check,

    /// List units per namespace
    List {
        /// Only list this namespace
        namespace: Option<String>,
    },

    /// Print every unit in application order
    Order,

    /// Compute the units needed to move from one state to another
    Plan {
        /// Starting versions, one per namespace (default: every namespace at 0)
        #[arg(long, num_args = 1.., value_parser = parse_version, conflicts_with = "from_state")]
        from: Vec<Version>,
        /// Target versions, one per namespace
        #[arg(long, num_args = 1.., value_parser = parse_version, conflicts_with_all = ["to_state", "to_latest"])]
        to: Vec<Version>,
        /// Start from a named state in [states]
        #[arg(long)]
        from_state: Option<String>,
        /// Target a named state in [states]
        #[arg(long, conflicts_with = "to_latest")]
        to_state: Option<String>,
        /// Target the latest unit of every namespace
        #[arg(long)]
        to_latest: bool,
        /// Succeed even if some requirements are not met by the starting state
        #[arg(long)]
        allow_unsatisfied: bool,
    },

    /// Show what a unit depends on
    Deps {
        /// Unit version, e.g. app-1.2
        #[arg(value_parser = parse_version)]
        version: Version,
        /// Show units that depend on this one instead
        #[arg(long, conflicts_with = "closure")]
        inverted: bool,
        /// Show the full computed dependency closure
        #[arg(long)]
        closure: bool,
        /// Maximum depth of the dependency tree
        #[arg(long)]
        depth: Option<usize>,
        /// Explain how this unit comes to depend on another one
        #[arg(long, value_parser = parse_version, conflicts_with_all = ["inverted", "closure"])]
        why: Option<Version>,
    },
}

fn parse_version(s: &str) -> Result<Version, String> {
    Version::parse(s).map_err(|e| e.to_string())
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
