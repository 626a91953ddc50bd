//! Patient Input Validation
//!
//! Provides the raw patient record type, range checking, and finiteness
//! validation for clinical measurements.

mod error;
mod record;
mod validator;

pub use error::ValidationError;
pub use record::PatientRecord;
pub use validator::{ValidationConfig, ValidationResult, Validator};
