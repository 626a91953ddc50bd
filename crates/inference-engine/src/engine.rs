//! Inference Engine Implementation

use crate::model::{GbtClassifier, RiskLabel};
use crate::scaler::Scaler;
use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Prediction produced by one inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Hard risk label
    pub label: RiskLabel,
    /// Positive-class probability
    pub probability: f64,
    /// Timestamp when the prediction was made
    pub timestamp_ms: u64,
}

/// Result of an inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: Prediction,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Loaded artifact pair, armed for serving
#[derive(Debug)]
struct Artifacts {
    scaler: Scaler,
    classifier: GbtClassifier,
}

/// Inference engine owning the scaler and classifier artifacts
///
/// Both artifacts are loaded once at startup and never mutated afterwards, so
/// `&self` prediction calls are safe to share across concurrent requests
/// without locking.
#[derive(Debug)]
pub struct InferenceEngine {
    scaler_path: PathBuf,
    model_path: PathBuf,
    artifacts: Option<Artifacts>,
}

impl InferenceEngine {
    /// Create an engine pointing at artifact files, not yet loaded
    pub fn new(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Self {
        Self {
            scaler_path: scaler_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            artifacts: None,
        }
    }

    /// Build an armed engine from in-memory artifacts
    pub fn from_parts(scaler: Scaler, classifier: GbtClassifier) -> Result<Self, InferenceError> {
        Self::check_dimensions(&scaler, &classifier)?;
        Ok(Self {
            scaler_path: PathBuf::new(),
            model_path: PathBuf::new(),
            artifacts: Some(Artifacts { scaler, classifier }),
        })
    }

    /// Load both artifacts
    ///
    /// Must succeed before any prediction is served; a failure here is a fatal
    /// startup error for the process.
    pub fn load(&mut self) -> Result<(), InferenceError> {
        let scaler = Scaler::from_file(&self.scaler_path)?;
        let classifier = GbtClassifier::from_file(&self.model_path)?;
        Self::check_dimensions(&scaler, &classifier)?;

        info!(
            "Inference engine armed: {} features, {} trees",
            scaler.len(),
            classifier.tree_count()
        );
        self.artifacts = Some(Artifacts { scaler, classifier });
        Ok(())
    }

    /// The two artifacts must have been fitted on the identical feature schema
    fn check_dimensions(
        scaler: &Scaler,
        classifier: &GbtClassifier,
    ) -> Result<(), InferenceError> {
        if scaler.len() != classifier.n_features() {
            return Err(InferenceError::DimensionMismatch {
                expected: classifier.n_features(),
                actual: scaler.len(),
            });
        }
        Ok(())
    }

    /// Check whether both artifacts are loaded
    pub fn is_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Feature count of the loaded artifacts, if armed
    pub fn n_features(&self) -> Option<usize> {
        self.artifacts.as_ref().map(|a| a.scaler.len())
    }

    /// Tree count of the loaded classifier, if armed
    pub fn tree_count(&self) -> Option<usize> {
        self.artifacts.as_ref().map(|a| a.classifier.tree_count())
    }

    /// Scale a feature vector and run it through the classifier
    pub fn predict(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let artifacts = self.artifacts.as_ref().ok_or(InferenceError::ModelUnavailable)?;
        let scaled = artifacts.scaler.transform(features)?;
        let probability = artifacts.classifier.predict_probability(&scaled)?;
        let label = RiskLabel::from_probability(probability);

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let latency_us = start.elapsed().as_micros() as u64;
        debug!(
            "Prediction: {} (p={:.3}, latency={}us)",
            label.as_str(),
            probability,
            latency_us
        );

        Ok(InferenceResult {
            prediction: Prediction {
                label,
                probability,
                timestamp_ms,
            },
            latency_us,
        })
    }
}
