//! Model Inference
//!
//! Loads the fitted scaler and gradient-boosted classifier artifacts and runs
//! assembled feature vectors through them.

mod engine;
mod model;
mod scaler;

pub use engine::{InferenceEngine, InferenceResult, Prediction};
pub use model::{GbtClassifier, RiskLabel, TreeNode};
pub use scaler::{ScaledVector, Scaler};

use thiserror::Error;

/// Errors during artifact loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Artifact file missing, unreadable, or failed schema validation
    #[error("Artifact load failed: {0}")]
    ArtifactLoad(String),

    /// Scaler, classifier, and feature vector disagree on feature count
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Inference attempted without both artifacts loaded
    #[error("Model artifacts not loaded")]
    ModelUnavailable,
}
