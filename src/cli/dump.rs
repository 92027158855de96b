//! Dump subcommand for hits
//!
//! Writes the completed HITs of one template to a CSV results file.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the dump_results subcommand
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// HTML form template whose completed HITs are dumped
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Output CSV path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Force gzip compression (auto-detected from .gz extension otherwise)
    #[arg(long)]
    pub gzip: bool,
}
