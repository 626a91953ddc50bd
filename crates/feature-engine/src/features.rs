//! Feature Vector Assembly

use patient_validator::{PatientRecord, ValidationConfig, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features consumed by the scaler and classifier
pub const FEATURE_DIMENSION: usize = 10;

/// Fixed-order feature vector for model inference
///
/// Slot order is the order the artifacts were fitted on and must never change:
/// pregnancies, glucose, blood pressure, skin thickness, insulin, bmi,
/// diabetes pedigree function, age, bmi*glucose, age*insulin.
///
/// The backing array is private; a vector can only be built from a
/// [`PatientRecord`], so callers cannot reorder slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
    /// BMI x glucose interaction term
    pub bmi_glucose: f64,
    /// Age x insulin interaction term
    pub age_insulin: f64,
}

impl FeatureVector {
    /// Assemble the ordered vector from a raw record
    ///
    /// Performs no validation; [`FeatureAssembler::assemble`] is the validated
    /// front door.
    pub fn from_record(record: &PatientRecord) -> Self {
        let bmi_glucose = record.bmi * record.glucose;
        let age_insulin = f64::from(record.age) * record.insulin;

        let values = [
            f64::from(record.pregnancies),
            record.glucose,
            record.blood_pressure,
            record.skin_thickness,
            record.insulin,
            record.bmi,
            record.diabetes_pedigree_function,
            f64::from(record.age),
            bmi_glucose,
            age_insulin,
        ];

        Self {
            values,
            bmi_glucose,
            age_insulin,
        }
    }

    /// Ordered feature values
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    /// Number of features
    pub fn len(&self) -> usize {
        FEATURE_DIMENSION
    }

    /// Always false; the dimension is fixed
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Feature assembler that validates records before building vectors
pub struct FeatureAssembler {
    validator: Validator,
}

impl FeatureAssembler {
    /// Create an assembler with the given validation ranges
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            validator: Validator::new(config),
        }
    }

    /// Validate a record and assemble its feature vector
    ///
    /// Fails fast on the first out-of-domain or non-finite field; nothing
    /// out-of-domain ever reaches the scaler.
    pub fn assemble(&self, record: &PatientRecord) -> Result<FeatureVector, ValidationError> {
        self.validator.validate_pregnancies(record.pregnancies)?;
        self.validator.validate_glucose(record.glucose)?;
        self.validator.validate_blood_pressure(record.blood_pressure)?;
        self.validator.validate_skin_thickness(record.skin_thickness)?;
        self.validator.validate_insulin(record.insulin)?;
        self.validator.validate_bmi(record.bmi)?;
        self.validator.validate_pedigree(record.diabetes_pedigree_function)?;
        self.validator.validate_age(record.age)?;

        let features = FeatureVector::from_record(record);
        debug!(
            bmi_glucose = features.bmi_glucose,
            age_insulin = features.age_insulin,
            "Assembled feature vector"
        );
        Ok(features)
    }

    /// Access the underlying validator
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
