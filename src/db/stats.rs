//! Aggregate record counts.

use super::Database;
use crate::types::Stats;
use anyhow::Result;

impl Database {
    /// Count templates, HITs and completed HITs.
    pub fn get_stats(&self) -> Result<Stats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM hit_templates),
                    (SELECT COUNT(*) FROM hits),
                    (SELECT COUNT(*) FROM hits WHERE completed = 1)",
                [],
                |row| {
                    Ok(Stats {
                        templates: row.get(0)?,
                        hits: row.get(1)?,
                        completed_hits: row.get(2)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }
}
