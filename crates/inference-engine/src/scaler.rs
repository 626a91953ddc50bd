//! Feature Scaling Artifact

use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Per-feature affine scaling transform fitted during training
///
/// Applies `(x_i - center_i) / scale_i` element-wise. The parameters are
/// opaque artifact data; nothing here re-fits or updates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    /// Per-feature center, subtracted first
    center: Vec<f64>,
    /// Per-feature scale, divided second
    scale: Vec<f64>,
}

/// Feature vector after scaling
///
/// The only input type the classifier accepts, so an unscaled vector cannot
/// reach the trees by mistake.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector(Vec<f64>);

impl ScaledVector {
    /// Scaled values in feature order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Scaler {
    /// Create a scaler from fitted parameters
    pub fn new(center: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        let scaler = Self { center, scale };
        scaler.check_parameters()?;
        Ok(scaler)
    }

    /// Identity scaler: zero center, unit scale
    pub fn identity(len: usize) -> Self {
        Self {
            center: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    /// Load a fitted scaler from a JSON artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ArtifactLoad(format!("read {}: {}", path.display(), e)))?;
        let scaler: Self = serde_json::from_str(&raw)
            .map_err(|e| InferenceError::ArtifactLoad(format!("parse {}: {}", path.display(), e)))?;
        scaler.check_parameters()?;

        info!("Loaded scaler for {} features from {}", scaler.len(), path.display());
        Ok(scaler)
    }

    fn check_parameters(&self) -> Result<(), InferenceError> {
        if self.center.len() != self.scale.len() {
            return Err(InferenceError::ArtifactLoad(format!(
                "scaler center/scale length mismatch: {} vs {}",
                self.center.len(),
                self.scale.len()
            )));
        }
        for (i, (&c, &s)) in self.center.iter().zip(&self.scale).enumerate() {
            if !c.is_finite() || !s.is_finite() {
                return Err(InferenceError::ArtifactLoad(format!(
                    "scaler parameter for feature {i} is not finite"
                )));
            }
            if s == 0.0 {
                return Err(InferenceError::ArtifactLoad(format!(
                    "scaler feature {i} has zero scale"
                )));
            }
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on
    pub fn len(&self) -> usize {
        self.center.len()
    }

    /// Whether the scaler holds no parameters
    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// Apply the per-element affine map
    pub fn transform(&self, features: &FeatureVector) -> Result<ScaledVector, InferenceError> {
        if self.len() != FEATURE_DIMENSION {
            return Err(InferenceError::DimensionMismatch {
                expected: FEATURE_DIMENSION,
                actual: self.len(),
            });
        }

        let scaled = features
            .values()
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(&x, (&c, &s))| (x - c) / s)
            .collect();
        Ok(ScaledVector(scaled))
    }
}
