//! Publish subcommand for hits
//!
//! Reads an HTML template and a CSV of input values and creates one HIT
//! per data row.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the publish_hits subcommand
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// HTML form template; stored under its absolute path
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// CSV file whose header names the input fields
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,
}
