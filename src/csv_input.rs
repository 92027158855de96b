//! CSV input parsing.
//!
//! Splits a UTF-8 byte stream into a header row and a lazy sequence of data
//! rows. LF and CRLF terminated input parse identically, and quoted fields
//! may carry the delimiter, line breaks, doubled quotes and non-ASCII text.

use crate::error::{CsvError, CsvResult};
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use std::io::{Cursor, Read};

const UTF8_BOM: char = '\u{feff}';

/// Dialect options for reading and writing CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Lazy iterator over the data rows that follow the header.
pub struct CsvRows {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
}

impl Iterator for CsvRows {
    type Item = CsvResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|result| {
            result
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(CsvError::from)
        })
    }
}

/// Parse a CSV stream into its header and remaining rows.
///
/// The whole stream is decoded up front so that decode errors and unclosed
/// quotes are reported before any row is handed out; rows themselves are
/// tokenized on demand.
pub fn parse_csv_file<R: Read>(mut input: R, options: &CsvOptions) -> CsvResult<(Vec<String>, CsvRows)> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    let mut text = String::from_utf8(bytes).map_err(|e| CsvError::Decode {
        offset: e.utf8_error().valid_up_to(),
    })?;
    if text.starts_with(UTF8_BOM) {
        text.drain(..UTF8_BOM.len_utf8());
    }

    if let Some(line) = find_unterminated_quote(&text, options.delimiter) {
        return Err(CsvError::UnterminatedQuote { line });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(Cursor::new(text.into_bytes()));

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() {
        return Err(CsvError::MissingHeader);
    }

    Ok((
        header,
        CsvRows {
            records: reader.into_records(),
        },
    ))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Return the line on which a still-open quoted field began, if any.
///
/// Mirrors the tokenizer's rules: a quote only opens a field at field start,
/// and inside a quoted field `""` is an escaped quote.
fn find_unterminated_quote(text: &str, delimiter: u8) -> Option<u64> {
    let mut state = ScanState::FieldStart;
    let mut line: u64 = 1;
    let mut opened_on: u64 = 1;

    for &b in text.as_bytes() {
        state = match (state, b) {
            (ScanState::FieldStart, b'"') => {
                opened_on = line;
                ScanState::Quoted
            }
            (ScanState::Quoted, b'"') => ScanState::QuoteInQuoted,
            (ScanState::Quoted, _) => ScanState::Quoted,
            (ScanState::QuoteInQuoted, b'"') => ScanState::Quoted,
            (_, c) if c == delimiter || c == b'\n' || c == b'\r' => ScanState::FieldStart,
            _ => ScanState::Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }

    (state == ScanState::Quoted).then_some(opened_on)
}
