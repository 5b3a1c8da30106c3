use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// Every variant is fatal to the ingestion attempt that produced it. Rows that fail to map are
/// not errors; they are reported as [`crate::types::RowRejection`]s and the batch continues.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Delimited-text reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file name does not carry a recognized suffix (`.csv`, `.xlsx`, `.xls`).
    #[error("unsupported file type '{file}': please upload a CSV or Excel file")]
    UnsupportedFormat { file: String },

    /// No header line, no sheets, or no readable header row.
    #[error("empty input: {message}")]
    EmptyInput { message: String },

    /// One or more required fields have no matching header. Reported once per file.
    #[error(
        "file is missing required data columns (or uses unrecognized names). Could not find: {}. Detected headers: {}",
        .missing.join(", "),
        .detected.join(", ")
    )]
    MissingRequiredColumns {
        /// Preferred display name of every missing required field, in schema order.
        missing: Vec<String>,
        /// Headers exactly as detected in the file.
        detected: Vec<String>,
    },

    /// Ingestion completed but produced no usable record.
    #[error("no valid machine data found in file ({rejected} row(s) rejected)")]
    NoValidRows { rejected: usize },
}
