//! Error taxonomy for loading, cleaning and summarising tables.
//!
//! Every operation in the core returns [`Result`], and each failure maps to
//! exactly one [`AnalyticsError`] variant. Errors are raised at the call that
//! detects them; nothing is defaulted or partially computed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Malformed delimited source or inconsistent table shape.
    #[error("Malformed input: {0}")]
    Format(String),

    /// Source had no header or no data rows.
    #[error("Source contains no {0}")]
    EmptySource(&'static str),

    /// Numeric column where every cell is missing, so no mean exists.
    #[error("Column '{0}' has no values to average")]
    AllMissing(String),

    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Column exists but has the wrong kind for the requested operation.
    #[error("Column '{column}' is {actual} but {expected} is required")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Column still carries missing cells; clean the table first.
    #[error("Column '{column}' contains {missing} missing value(s)")]
    MissingValues { column: String, missing: usize },

    #[error("Column '{column}' needs at least {required} value(s) but has {found}")]
    InsufficientData {
        column: String,
        required: usize,
        found: usize,
    },

    #[error("Column '{0}' has zero variance")]
    ZeroVariance(String),

    /// A statistic of the column exceeds the representable f64 range.
    #[error("Statistics for column '{0}' overflow the f64 range")]
    Overflow(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalyticsError {
    /// Stable identifier for the failure class.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Format(_) => "FORMAT",
            Self::EmptySource(_) => "EMPTY_SOURCE",
            Self::AllMissing(_) => "ALL_MISSING",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::ColumnType { .. } => "COLUMN_TYPE",
            Self::MissingValues { .. } => "MISSING_VALUES",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::ZeroVariance(_) => "ZERO_VARIANCE",
            Self::Overflow(_) => "OVERFLOW",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Io(_) => "IO_ERROR",
            Self::Csv(_) => "CSV_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
