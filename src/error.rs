use thiserror::Error;

/// Errors raised by the sampling and testing core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    /// Bad fraction, zero-size dataset, non-positive sample size, malformed series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No numeric columns, or no shared numeric columns between two datasets.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A per-column comparison could not be computed.
    #[error("comparison failed for column '{column}': {reason}")]
    ComparisonError { column: String, reason: String },
}

impl ScanError {
    /// Short stable name of the error kind, for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InvalidInput(_) => "InvalidInput",
            ScanError::EmptyInput(_) => "EmptyInput",
            ScanError::ComparisonError { .. } => "ComparisonError",
        }
    }

    pub(crate) fn comparison(column: &str, reason: impl Into<String>) -> Self {
        ScanError::ComparisonError {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
