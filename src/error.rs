use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type used across the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by extraction, storage, cleaning, and driver functions.
///
/// Malformed input records are not errors; they are counted in
/// [`crate::ingestion::ExtractionReport`]. Everything here aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input resource could not be opened (missing file, permission denied).
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output resource could not be created.
    #[error("failed to create '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O error while reading or writing an already-open resource.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is not valid TOML or has wrongly typed keys.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Dataset download failed.
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// A table does not have the columns an operation requires.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed or coerced into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn missing_column(column: &str) -> Self {
        Self::SchemaMismatch {
            message: format!("missing required column '{column}'"),
        }
    }
}
