//! hits
//!
//! Publishes HITs from an HTML template and a CSV of inputs, and dumps the
//! answers of completed HITs back to CSV.

use anyhow::{Context, Result};
use clap::Parser;
use hits::cli::dump::DumpArgs;
use hits::cli::publish::PublishArgs;
use hits::cli::{Cli, Command};
use hits::commands::dump::{DumpOptions, dump_results};
use hits::commands::publish::publish_hits;
use hits::config::{Config, ConfigLoader};
use hits::db::Database;
use hits::logging::{self, LogTarget};
use std::path::Path;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(Path::new(path))?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = loader.config_path() {
        debug!("Config file: {:?}", path);
    }

    let mut config = loader.into_config();
    if let Some(db_path) = &cli.database {
        config.database.path = db_path.into();
    }

    match cli.command {
        Command::PublishHits(args) => run_publish(&config, args),
        Command::DumpResults(args) => run_dump(&config, args),
        Command::Stats => run_stats(&config),
    }
}

/// Open the configured database, creating its directory if needed.
fn open_database(config: &Config) -> Result<Database> {
    config.ensure_db_dir()?;
    info!("Database: {:?}", config.database.path);
    Database::open_with_busy_timeout(&config.database.path, config.database.busy_timeout_ms)
        .with_context(|| format!("failed to open database {}", config.database.path.display()))
}

/// Run the publish_hits command
fn run_publish(config: &Config, args: PublishArgs) -> Result<()> {
    let db = open_database(config)?;
    let options = config.csv.options()?;

    let stderr = std::io::stderr();
    let mut status = stderr.lock();
    publish_hits(&db, &args.template, &args.csv, &options, &mut status)?;

    Ok(())
}

/// Run the dump_results command
fn run_dump(config: &Config, args: DumpArgs) -> Result<()> {
    let db = open_database(config)?;
    let options = DumpOptions {
        csv: config.csv.options()?,
        gzip: args.gzip,
    };

    dump_results(&db, &args.template, &args.output, &options)?;

    Ok(())
}

/// Run the stats command
fn run_stats(config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let stats = db.get_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
