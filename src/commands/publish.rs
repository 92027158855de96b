//! Publish HITs from an HTML template and a CSV of input values.

use super::template_name;
use crate::csv_input::{CsvOptions, parse_csv_file};
use crate::store::HitStore;
use crate::types::{FieldMap, HitTemplate};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one publish run.
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub template: HitTemplate,
    pub template_created: bool,
    pub hits_created: usize,
}

/// Pair header names with a row's cells.
///
/// Short rows are padded with empty strings so every header is a key; cells
/// past the header width are dropped. A repeated header keeps its last cell.
pub fn row_fields(header: &[String], mut row: Vec<String>, row_number: usize) -> FieldMap {
    if row.len() > header.len() {
        warn!(
            row = row_number,
            expected = header.len(),
            found = row.len(),
            "Dropping CSV cells beyond the header width"
        );
        row.truncate(header.len());
    }
    row.resize(header.len(), String::new());

    header.iter().cloned().zip(row).collect()
}

/// Publish one HIT per data row of `csv_path`, bound to the template read
/// from `template_path`.
///
/// Writes `Creating HITs: N HITs created.` to `status`. HITs are created one
/// at a time, so a failure part-way keeps the HITs already created.
pub fn publish_hits<S, W>(
    store: &S,
    template_path: &Path,
    csv_path: &Path,
    options: &CsvOptions,
    status: &mut W,
) -> Result<PublishSummary>
where
    S: HitStore + ?Sized,
    W: Write + ?Sized,
{
    let form = fs::read_to_string(template_path)
        .with_context(|| format!("failed to read template {}", template_path.display()))?;
    let name = template_name(template_path)?;
    let (template, template_created) = store.find_or_create_template(&name, &form)?;

    let file = File::open(csv_path)
        .with_context(|| format!("failed to open CSV {}", csv_path.display()))?;
    let (header, rows) = parse_csv_file(BufReader::new(file), options)
        .with_context(|| format!("failed to parse CSV {}", csv_path.display()))?;

    write!(status, "Creating HITs: ")?;
    status.flush()?;

    let mut hits_created = 0;
    let created: Result<()> = rows.enumerate().try_for_each(|(index, row)| {
        let row = row.with_context(|| format!("failed to parse CSV {}", csv_path.display()))?;
        let fields = row_fields(&header, row, index + 1);
        store.create_hit(template.id, &fields)?;
        hits_created += 1;
        Ok(())
    });
    if let Err(err) = created {
        // End the status line so the error report starts on its own line.
        writeln!(status)?;
        status.flush()?;
        return Err(err);
    }

    writeln!(status, "{} HITs created.", hits_created)?;
    status.flush()?;

    info!(
        template = %template.name,
        template_id = template.id,
        template_created,
        hits_created,
        "Published HITs"
    );

    Ok(PublishSummary {
        template,
        template_created,
        hits_created,
    })
}
