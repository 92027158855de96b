//! HIT publishing library
//!
//! Publishes HIT records from an HTML form template plus a CSV of input
//! values, and dumps the answers of completed HITs back to CSV.

pub mod cli;
pub mod commands;
pub mod config;
pub mod csv_input;
pub mod db;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;
