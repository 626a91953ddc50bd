//! Validation Error Types

use thiserror::Error;

/// Errors during patient input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value is NaN or infinite
    #[error("{field} value {value} is not finite")]
    NonFinite { field: &'static str, value: f64 },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
