use thiserror::Error;

/// Everything that can abort a seed or backfill job.
///
/// Data-quality problems in individual rows are not errors: the jobs log them
/// and move on to the next row.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid identifier: {0}")]
    Identifier(#[from] uuid::Error),
    #[error("failed to encode recipient list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reference data is empty: {0}")]
    EmptyReferenceData(&'static str),
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, SeedError>;
