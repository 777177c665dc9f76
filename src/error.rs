//! Error types for the pricing engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Structural problems found in an invoice.
///
/// Carries every detected problem, not only the first; the message joins
/// them with `"; "`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .problems.join("; "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl ValidationError {
    pub fn new(problems: Vec<String>) -> Self {
        ValidationError { problems }
    }
}

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Rate table document could not be decoded
    #[error("Rate table parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invoice failed structural validation
    #[error("Invalid invoice: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid invoice row
    #[error("Invalid invoice row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Rate tables violate their own constraints
    #[error("Invalid rate tables: {0}")]
    InvalidRates(String),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: invoice-pricing <invoices.csv> [rates.json]")]
    MissingArgument,
}
