//! Gradient-Boosted Tree Classifier Artifact

use crate::scaler::ScaledVector;
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Binary risk label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    /// Model output 0
    NotDiabetic,
    /// Model output 1
    Diabetic,
}

impl RiskLabel {
    /// Threshold a positive-class probability at the 0.5 decision boundary
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.5 {
            RiskLabel::Diabetic
        } else {
            RiskLabel::NotDiabetic
        }
    }

    /// Numeric model output
    pub fn as_u8(&self) -> u8 {
        match self {
            RiskLabel::NotDiabetic => 0,
            RiskLabel::Diabetic => 1,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::NotDiabetic => "not_diabetic",
            RiskLabel::Diabetic => "diabetic",
        }
    }

    /// Patient-facing guidance for this outcome
    pub fn guidance(&self) -> &'static str {
        match self {
            RiskLabel::NotDiabetic => "Healthy blood sugar level detected",
            RiskLabel::Diabetic => "Early diagnosis is crucial, please consult a doctor",
        }
    }
}

/// One node of a fitted decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: `x[feature] < threshold` goes left, otherwise right
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Terminal leaf contributing `weight` to the margin
    Leaf { weight: f64 },
}

impl TreeNode {
    /// Walk the tree for one sample and return the reached leaf weight
    fn score(&self, values: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { weight } => return *weight,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if values[*feature] < *threshold { left } else { right };
                }
            }
        }
    }

    fn check(&self, n_features: usize) -> Result<(), InferenceError> {
        match self {
            TreeNode::Leaf { weight } => {
                if !weight.is_finite() {
                    return Err(InferenceError::ArtifactLoad(
                        "tree leaf weight is not finite".to_string(),
                    ));
                }
                Ok(())
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(InferenceError::ArtifactLoad(format!(
                        "tree split references feature {feature}, model has {n_features}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(InferenceError::ArtifactLoad(format!(
                        "tree split on feature {feature} has non-finite threshold"
                    )));
                }
                left.check(n_features)?;
                right.check(n_features)
            }
        }
    }
}

/// Fitted gradient-boosted tree ensemble for binary classification
///
/// Trees are applied additively on the margin (log-odds) scale; the sigmoid of
/// the summed margin is the positive-class probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbtClassifier {
    /// Feature count the ensemble was fitted on
    n_features: usize,
    /// Prior positive-class probability
    base_score: f64,
    /// Boosted trees in application order
    trees: Vec<TreeNode>,
}

impl GbtClassifier {
    /// Create a classifier from in-memory parts
    pub fn new(
        n_features: usize,
        base_score: f64,
        trees: Vec<TreeNode>,
    ) -> Result<Self, InferenceError> {
        let classifier = Self {
            n_features,
            base_score,
            trees,
        };
        classifier.check()?;
        Ok(classifier)
    }

    /// Load a fitted classifier from a JSON artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ArtifactLoad(format!("read {}: {}", path.display(), e)))?;
        let classifier: Self = serde_json::from_str(&raw)
            .map_err(|e| InferenceError::ArtifactLoad(format!("parse {}: {}", path.display(), e)))?;
        classifier.check()?;

        info!(
            "Loaded classifier: {} trees over {} features from {}",
            classifier.trees.len(),
            classifier.n_features,
            path.display()
        );
        Ok(classifier)
    }

    /// Single-leaf stub that always predicts the given label
    ///
    /// Intended for tests and for exercising the pipeline without a trained
    /// artifact.
    pub fn constant(n_features: usize, label: RiskLabel) -> Self {
        let weight = match label {
            RiskLabel::Diabetic => 10.0,
            RiskLabel::NotDiabetic => -10.0,
        };
        Self {
            n_features,
            base_score: 0.5,
            trees: vec![TreeNode::Leaf { weight }],
        }
    }

    fn check(&self) -> Result<(), InferenceError> {
        if !(self.base_score.is_finite() && self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(InferenceError::ArtifactLoad(format!(
                "classifier base score {} is outside (0, 1)",
                self.base_score
            )));
        }
        if self.trees.is_empty() {
            return Err(InferenceError::ArtifactLoad(
                "classifier has no trees".to_string(),
            ));
        }
        for tree in &self.trees {
            tree.check(self.n_features)?;
        }
        Ok(())
    }

    /// Feature count the ensemble was fitted on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of boosted trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw additive margin (log-odds) for one sample
    pub fn margin(&self, scaled: &ScaledVector) -> Result<f64, InferenceError> {
        if scaled.len() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: scaled.len(),
            });
        }

        let base = (self.base_score / (1.0 - self.base_score)).ln();
        let boost: f64 = self
            .trees
            .iter()
            .map(|tree| tree.score(scaled.as_slice()))
            .sum();
        Ok(base + boost)
    }

    /// Positive-class probability for one sample
    pub fn predict_probability(&self, scaled: &ScaledVector) -> Result<f64, InferenceError> {
        let margin = self.margin(scaled)?;
        Ok(1.0 / (1.0 + (-margin).exp()))
    }

    /// Hard 0/1 label at the 0.5 decision boundary
    pub fn predict_label(&self, scaled: &ScaledVector) -> Result<RiskLabel, InferenceError> {
        Ok(RiskLabel::from_probability(self.predict_probability(scaled)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::Scaler;
    use feature_engine::{FeatureVector, FEATURE_DIMENSION};
    use patient_validator::PatientRecord;

    fn scaled() -> ScaledVector {
        let features = FeatureVector::from_record(&PatientRecord {
            pregnancies: 1,
            glucose: 120.0,
            blood_pressure: 70.0,
            skin_thickness: 20.0,
            insulin: 80.0,
            bmi: 25.0,
            diabetes_pedigree_function: 0.5,
            age: 30,
        });
        Scaler::identity(FEATURE_DIMENSION).transform(&features).unwrap()
    }

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(TreeNode::Leaf { weight: low }),
            right: Box::new(TreeNode::Leaf { weight: high }),
        }
    }

    #[test]
    fn test_constant_positive_classifier() {
        let classifier = GbtClassifier::constant(FEATURE_DIMENSION, RiskLabel::Diabetic);
        let probability = classifier.predict_probability(&scaled()).unwrap();
        assert!(probability > 0.99);
        assert_eq!(classifier.predict_label(&scaled()).unwrap(), RiskLabel::Diabetic);
    }

    #[test]
    fn test_constant_negative_classifier() {
        let classifier = GbtClassifier::constant(FEATURE_DIMENSION, RiskLabel::NotDiabetic);
        assert_eq!(
            classifier.predict_label(&scaled()).unwrap(),
            RiskLabel::NotDiabetic
        );
    }

    #[test]
    fn test_split_routing() {
        // glucose is slot 1; 120 >= 100 routes right
        let classifier =
            GbtClassifier::new(FEATURE_DIMENSION, 0.5, vec![stump(1, 100.0, -2.0, 2.0)]).unwrap();
        let margin = classifier.margin(&scaled()).unwrap();
        assert!((margin - 2.0).abs() < 1e-12);

        let classifier =
            GbtClassifier::new(FEATURE_DIMENSION, 0.5, vec![stump(1, 200.0, -2.0, 2.0)]).unwrap();
        let margin = classifier.margin(&scaled()).unwrap();
        assert!((margin + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_margins_accumulate_across_trees() {
        let trees = vec![stump(1, 100.0, -1.0, 1.0), stump(5, 0.0, -0.5, 0.5)];
        let classifier = GbtClassifier::new(FEATURE_DIMENSION, 0.5, trees).unwrap();
        // glucose 120 -> +1.0, bmi 25 -> +0.5
        let margin = classifier.margin(&scaled()).unwrap();
        assert!((margin - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_base_score_shifts_margin() {
        let classifier = GbtClassifier::new(
            FEATURE_DIMENSION,
            0.25,
            vec![TreeNode::Leaf { weight: 0.0 }],
        )
        .unwrap();
        let probability = classifier.predict_probability(&scaled()).unwrap();
        assert!((probability - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let classifier =
            GbtClassifier::new(FEATURE_DIMENSION, 0.35, vec![stump(7, 40.0, -0.3, 0.7)]).unwrap();
        let first = classifier.predict_probability(&scaled()).unwrap();
        let second = classifier.predict_probability(&scaled()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_feature_index_rejected() {
        let err =
            GbtClassifier::new(FEATURE_DIMENSION, 0.5, vec![stump(10, 0.0, -1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactLoad(_)));
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        assert!(GbtClassifier::new(FEATURE_DIMENSION, 0.5, vec![]).is_err());
    }

    #[test]
    fn test_tree_json_round_trip() {
        let classifier =
            GbtClassifier::new(FEATURE_DIMENSION, 0.35, vec![stump(8, 0.4, -0.6, 0.9)]).unwrap();
        let json = serde_json::to_string(&classifier).unwrap();
        let parsed: GbtClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.margin(&scaled()).unwrap(),
            classifier.margin(&scaled()).unwrap()
        );
    }
}
