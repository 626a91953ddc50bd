//! Storage Layer
//!
//! Bounded in-memory history of served predictions, behind a repository
//! interface.

mod repository;

pub use repository::{PredictionRecord, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Interior lock was poisoned
    #[error("Lock error: {0}")]
    LockError(String),
    /// Record not found
    #[error("Record not found")]
    NotFound,
}
