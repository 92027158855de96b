//! CLI command definitions for hits
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod dump;
pub mod publish;

use clap::{Parser, Subcommand};
use dump::DumpArgs;
use publish::PublishArgs;

/// Publish HITs from HTML templates and CSV inputs, and dump their results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create one HIT per CSV row, bound to an HTML template
    #[command(name = "publish_hits", alias = "publish-hits")]
    PublishHits(PublishArgs),

    /// Write the inputs and answers of completed HITs to CSV
    #[command(name = "dump_results", alias = "dump-results")]
    DumpResults(DumpArgs),

    /// Print template and HIT counts as JSON
    Stats,
}
