use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the inventory explorer.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// A file's tabular structure could not be parsed at all.
    ///
    /// This is the only ingestion failure that escapes a file; it rejects
    /// the whole upload batch the file belongs to.
    #[error("Failed to parse {file}: {message}")]
    FileParse { file: String, message: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Low-level CSV reader/writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A filtered view could not be serialized back to CSV.
    #[error("Export failed: {0}")]
    Export(String),

    /// The requested input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// A background ingestion task panicked or was cancelled.
    #[error("Ingestion task failed: {0}")]
    TaskJoin(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InventoryError {
    /// Build a [`InventoryError::FileParse`] for `file`.
    pub fn parse(file: impl Into<String>, message: impl std::fmt::Display) -> Self {
        InventoryError::FileParse {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Name of the offending file, when the error is tied to one.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            InventoryError::FileParse { file, .. } => Some(file),
            _ => None,
        }
    }
}

/// Why a single data row was dropped during normalization.
///
/// Row failures are absorbed by the ingestor and only surface as counters
/// in the ingestion diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The row carries more cells than the header declares.
    #[error("row has {found} fields but the header declares {expected}")]
    TooManyFields { expected: usize, found: usize },

    /// A cell is not valid UTF-8.
    #[error("row is not valid UTF-8")]
    InvalidUtf8,

    /// Any other structural problem with the row.
    #[error("malformed row: {0}")]
    Malformed(String),
}

/// Convenience alias used throughout the inventory crates.
pub type Result<T> = std::result::Result<T, InventoryError>;
