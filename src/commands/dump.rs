//! Dump the inputs and answers of completed HITs to CSV.

use super::template_name;
use crate::csv_input::CsvOptions;
use crate::store::HitStore;
use crate::types::Hit;
use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header prefix for input CSV columns.
pub const INPUT_PREFIX: &str = "Input.";
/// Header prefix for submitted answer fields.
pub const ANSWER_PREFIX: &str = "Answer.";

/// Options for writing a results file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    pub csv: CsvOptions,
    /// Gzip the output even when the path does not end in `.gz`.
    pub gzip: bool,
}

impl DumpOptions {
    /// Compress when asked to, or when the output path ends in `.gz`.
    pub fn should_compress(&self, output_path: &Path) -> bool {
        self.gzip || output_path.extension().is_some_and(|ext| ext == "gz")
    }
}

/// Outcome of one dump run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    pub rows_written: usize,
    pub compressed: bool,
}

/// Build the results header and rows for `hits`.
///
/// The header is every input field name (sorted, prefixed `Input.`) followed
/// by every answer field name (sorted, prefixed `Answer.`), unioned across
/// all HITs. Fields a HIT lacks are left blank.
pub fn results_data(hits: &[Hit]) -> (Vec<String>, Vec<Vec<String>>) {
    let input_names: BTreeSet<&str> = hits
        .iter()
        .flat_map(|hit| hit.input_csv_fields.keys().map(String::as_str))
        .collect();
    let answer_names: BTreeSet<&str> = hits
        .iter()
        .flat_map(|hit| hit.answers.keys().map(String::as_str))
        .collect();

    let header = input_names
        .iter()
        .map(|name| format!("{}{}", INPUT_PREFIX, name))
        .chain(answer_names.iter().map(|name| format!("{}{}", ANSWER_PREFIX, name)))
        .collect();

    let rows = hits
        .iter()
        .map(|hit| {
            let inputs = input_names
                .iter()
                .map(|name| hit.input_csv_fields.get(*name).cloned().unwrap_or_default());
            let answers = answer_names
                .iter()
                .map(|name| hit.answers.get(*name).cloned().unwrap_or_default());
            inputs.chain(answers).collect()
        })
        .collect();

    (header, rows)
}

/// Write a header and rows as CSV with CRLF terminators.
///
/// An empty header with no rows writes nothing.
pub fn write_results<W: Write>(
    out: &mut W,
    header: &[String],
    rows: &[Vec<String>],
    options: &CsvOptions,
) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(Terminator::CRLF)
        .from_writer(out);

    if !header.is_empty() {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the completed HITs of the template at `template_path` to `output_path`.
pub fn dump_results<S>(
    store: &S,
    template_path: &Path,
    output_path: &Path,
    options: &DumpOptions,
) -> Result<DumpSummary>
where
    S: HitStore + ?Sized,
{
    let name = template_name(template_path)?;
    let hits = store.completed_hits(Some(&name))?;
    if hits.is_empty() {
        info!(template = %name, "No completed HITs found for template");
    }

    let (header, rows) = results_data(&hits);
    let compressed = options.should_compress(output_path);

    let file = File::create(output_path)
        .with_context(|| format!("failed to create output {}", output_path.display()))?;
    if compressed {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_results(&mut encoder, &header, &rows, &options.csv)?;
        encoder.finish()?.flush()?;
    } else {
        let mut out = BufWriter::new(file);
        write_results(&mut out, &header, &rows, &options.csv)?;
        out.flush()?;
    }

    info!(
        template = %name,
        output = %output_path.display(),
        rows = rows.len(),
        compressed,
        "Dumped results"
    );

    Ok(DumpSummary {
        rows_written: rows.len(),
        compressed,
    })
}
