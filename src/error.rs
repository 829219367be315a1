use std::path::PathBuf;

use thiserror::Error;

/// Failure to materialize a table from its source. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column `{0}` is missing from the header")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid `Year` value `{value}`")]
    InvalidYear { line: u64, value: String },
}

/// Failure of a query against a loaded table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("column `{0}` not found in the loaded dataset")]
    ColumnNotFound(String),

    #[error("column `{0}` has no values")]
    EmptyTable(String),

    #[error("year range {min}..={max} is inverted")]
    InvertedYearRange { min: i32, max: i32 },
}
