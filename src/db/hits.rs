//! HIT creation, completion and queries.

use super::{Database, now_ms};
use crate::types::{FieldMap, Hit};
use anyhow::{Result, anyhow};
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

const HIT_COLUMNS: &str =
    "h.id, h.template_id, h.input_csv_fields, h.completed, h.answers, h.created_at, h.updated_at";

fn parse_field_map(json: &str, column: usize) -> rusqlite::Result<FieldMap> {
    serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn parse_hit_row(row: &Row) -> rusqlite::Result<Hit> {
    let input_json: String = row.get(2)?;
    let answers_json: String = row.get(4)?;

    Ok(Hit {
        id: row.get(0)?,
        template_id: row.get(1)?,
        input_csv_fields: parse_field_map(&input_json, 2)?,
        completed: row.get(3)?,
        answers: parse_field_map(&answers_json, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    /// Create a HIT bound to `template_id` with the given input fields.
    pub fn create_hit(&self, template_id: i64, input_csv_fields: &FieldMap) -> Result<Hit> {
        let fields_json = serde_json::to_string(input_csv_fields)?;
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO hits (template_id, input_csv_fields, completed, answers, created_at, updated_at)
                 VALUES (?1, ?2, 0, '{}', ?3, ?3)",
                params![template_id, fields_json, now],
            )?;
            let id = conn.last_insert_rowid();
            debug!(hit_id = id, template_id, "Created HIT");

            Ok(Hit {
                id,
                template_id,
                input_csv_fields: input_csv_fields.clone(),
                completed: false,
                answers: FieldMap::new(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    /// Get a HIT by id.
    pub fn get_hit(&self, id: i64) -> Result<Option<Hit>> {
        self.with_conn(|conn| {
            let hit = conn
                .query_row(
                    &format!("SELECT {} FROM hits h WHERE h.id = ?1", HIT_COLUMNS),
                    params![id],
                    parse_hit_row,
                )
                .optional()?;
            Ok(hit)
        })
    }

    /// Mark a HIT completed and store its submitted answers.
    pub fn complete_hit(&self, id: i64, answers: &FieldMap) -> Result<Hit> {
        let answers_json = serde_json::to_string(answers)?;
        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE hits SET completed = 1, answers = ?1, updated_at = ?2 WHERE id = ?3",
                params![answers_json, now_ms(), id],
            )?)
        })?;
        if updated == 0 {
            return Err(anyhow!("HIT not found: {}", id));
        }

        self.get_hit(id)?
            .ok_or_else(|| anyhow!("HIT not found: {}", id))
    }

    /// List completed HITs in id order, optionally limited to one template name.
    pub fn completed_hits(&self, template_name: Option<&str>) -> Result<Vec<Hit>> {
        self.with_conn(|conn| {
            let hits = match template_name {
                Some(name) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM hits h
                         INNER JOIN hit_templates t ON t.id = h.template_id
                         WHERE h.completed = 1 AND t.name = ?1
                         ORDER BY h.id",
                        HIT_COLUMNS
                    ))?;
                    stmt.query_map(params![name], parse_hit_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM hits h WHERE h.completed = 1 ORDER BY h.id",
                        HIT_COLUMNS
                    ))?;
                    stmt.query_map([], parse_hit_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(hits)
        })
    }

    /// List all HITs of a template in id order.
    pub fn hits_for_template(&self, template_id: i64) -> Result<Vec<Hit>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM hits h WHERE h.template_id = ?1 ORDER BY h.id",
                HIT_COLUMNS
            ))?;
            let hits = stmt
                .query_map(params![template_id], parse_hit_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(hits)
        })
    }
}
