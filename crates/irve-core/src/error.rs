use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the charge-point analysis crates.
///
/// Data-quality conditions (absent dates, invalid coordinates, missing
/// region names) are not errors: they are excluded from the affected view.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The caller asked to profile a field outside the supported set.
    #[error("Unsupported profiling field: {0}")]
    UnsupportedField(String),

    /// A dataset file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed outside of a single data row (e.g. headers).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A column the loader cannot do without is absent from the header row.
    #[error("Missing required column '{column}' in {dataset} dataset")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The report could not be serialized.
    #[error("Failed to serialize JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// A concurrent view worker panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    Task(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the analysis crates.
pub type Result<T> = std::result::Result<T, AnalysisError>;
