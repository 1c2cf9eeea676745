//! Error types for the morphometrics pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Every hard failure the library can report.
///
/// Per-row data-quality problems (blank fields, out-of-range coordinates) and
/// per-subject problems (incomplete record, asymmetric PRN) never show up here:
/// the former drop the row, the latter yield a `None` profile.
#[derive(Error, Debug)]
pub enum MorphoError {
    /// The input path does not resolve to a readable file.
    #[error("file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// A required column is missing from the header row.
    #[error("schema error: required column '{column}' not found in header")]
    Schema { column: String },

    /// A coordinate cell is not numeric, or a row is too short to cover
    /// every required column.
    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    /// A requested subject id is not present in the dataset.
    #[error("unknown subject id '{0}'")]
    Lookup(String),

    /// Cosine similarity over a zero-length vector.
    #[error("domain error: {0}")]
    Domain(String),

    /// The similarity scorer needs exactly two distance profiles.
    #[error("expected 2 distance profiles, got {0}")]
    ProfileCount(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl MorphoError {
    pub fn parse(row: usize, message: impl Into<String>) -> Self {
        MorphoError::Parse {
            row,
            message: message.into(),
        }
    }

    /// Whether the failure means the source could not be opened at all,
    /// as opposed to a data or lookup anomaly inside it.
    pub fn is_source_not_found(&self) -> bool {
        match self {
            MorphoError::SourceNotFound { .. } => true,
            MorphoError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MorphoError>;
