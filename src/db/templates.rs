//! HIT template lookups and creation.

use super::{Database, now_ms};
use crate::types::HitTemplate;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};

fn parse_template_row(row: &Row) -> rusqlite::Result<HitTemplate> {
    Ok(HitTemplate {
        id: row.get("id")?,
        name: row.get("name")?,
        form: row.get("form")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a template using an existing connection.
fn get_template_by_name_internal(conn: &Connection, name: &str) -> Result<Option<HitTemplate>> {
    let template = conn
        .query_row(
            "SELECT id, name, form, created_at FROM hit_templates WHERE name = ?1",
            params![name],
            parse_template_row,
        )
        .optional()?;
    Ok(template)
}

impl Database {
    /// Look up a template by name, creating it with `form` if it does not exist.
    ///
    /// Returns the template and whether it was created. An existing template
    /// keeps its stored form even when `form` differs.
    pub fn find_or_create_template(&self, name: &str, form: &str) -> Result<(HitTemplate, bool)> {
        self.with_conn(|conn| {
            if let Some(existing) = get_template_by_name_internal(conn, name)? {
                if existing.form != form {
                    warn!(
                        template = %name,
                        "Template form on disk differs from stored form; keeping stored form"
                    );
                }
                return Ok((existing, false));
            }

            let created_at = now_ms();
            conn.execute(
                "INSERT INTO hit_templates (name, form, created_at) VALUES (?1, ?2, ?3)",
                params![name, form, created_at],
            )?;
            let id = conn.last_insert_rowid();
            debug!(template_id = id, template = %name, "Created HIT template");

            Ok((
                HitTemplate {
                    id,
                    name: name.to_string(),
                    form: form.to_string(),
                    created_at,
                },
                true,
            ))
        })
    }

    /// Get a template by name.
    pub fn get_template_by_name(&self, name: &str) -> Result<Option<HitTemplate>> {
        self.with_conn(|conn| get_template_by_name_internal(conn, name))
    }

    /// Get a template by id.
    pub fn get_template(&self, id: i64) -> Result<HitTemplate> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, form, created_at FROM hit_templates WHERE id = ?1",
                params![id],
                parse_template_row,
            )
            .optional()?
            .ok_or_else(|| anyhow!("HIT template not found: {}", id))
        })
    }
}
