use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Failed to read input file '{}': {source}", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory '{}': {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} table has no key value in column '{column}' at row {row}")]
    MissingKey {
        table: String,
        column: String,
        row: usize,
    },

    #[error("Column '{0}' would appear twice in the table")]
    ColumnCollision(String),

    #[error("Column '{column}' has {actual} values but the table has {expected} rows")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Sample column '{header}' does not encode <patient>{separator}<timepoint>")]
    SampleHeader { header: String, separator: String },

    #[error("Validation failed at step '{step}': {message}")]
    Validation { step: String, message: String },
}

pub type Result<T> = std::result::Result<T, CleanerError>;
