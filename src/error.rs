//! Error types for CSV input.
//!
//! Database and command errors travel as `anyhow::Error`; CSV failures get a
//! typed error so callers (and tests) can match on the cause.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to read CSV input: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV input is not valid UTF-8 (first bad byte at offset {offset})")]
    Decode { offset: usize },

    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: u64 },

    #[error("malformed CSV record on line {line}: {message}")]
    Record { line: u64, message: String },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => CsvError::Io(e),
            kind => CsvError::Record {
                line,
                message: format!("{:?}", kind),
            },
        }
    }
}

pub type CsvResult<T> = std::result::Result<T, CsvError>;
