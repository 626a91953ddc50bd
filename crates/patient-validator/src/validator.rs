//! Patient Record Validator

use crate::error::ValidationError;
use crate::record::PatientRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
///
/// Ranges mirror the bounds enforced by the clinical intake form. They are
/// duplicated here so the pipeline never trusts its caller to have clamped
/// anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Pregnancy count valid range
    pub pregnancies_range: (u32, u32),
    /// Glucose valid range (mg/dL)
    pub glucose_range: (f64, f64),
    /// Blood pressure valid range (mm Hg)
    pub blood_pressure_range: (f64, f64),
    /// Skin thickness valid range (mm)
    pub skin_thickness_range: (f64, f64),
    /// Insulin valid range (IU/mL)
    pub insulin_range: (f64, f64),
    /// BMI valid range
    pub bmi_range: (f64, f64),
    /// Diabetes pedigree function valid range
    pub pedigree_range: (f64, f64),
    /// Age valid range (years)
    pub age_range: (u32, u32),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pregnancies_range: (0, 20),
            glucose_range: (0.0, 300.0),
            blood_pressure_range: (0.0, 200.0),
            skin_thickness_range: (0.0, 100.0),
            insulin_range: (0.0, 900.0),
            bmi_range: (0.0, 70.0),
            pedigree_range: (0.0, 3.0),
            age_range: (1, 120),
        }
    }
}

/// Result of validating a full record
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all fields are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Validator for raw patient records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single measurement against a range
    ///
    /// Non-finite values are rejected before any range comparison.
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            });
        }
        Ok(())
    }

    /// Validate an integer count against a range
    pub fn validate_count(
        &self,
        field: &'static str,
        value: u32,
        range: (u32, u32),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            return Err(ValidationError::OutOfRange {
                field,
                value: f64::from(value),
                min: f64::from(range.0),
                max: f64::from(range.1),
            });
        }
        Ok(())
    }

    /// Validate pregnancy count
    pub fn validate_pregnancies(&self, pregnancies: u32) -> Result<(), ValidationError> {
        self.validate_count("pregnancies", pregnancies, self.config.pregnancies_range)
    }

    /// Validate glucose level
    pub fn validate_glucose(&self, glucose: f64) -> Result<(), ValidationError> {
        self.validate_range("glucose", glucose, self.config.glucose_range)
    }

    /// Validate blood pressure
    pub fn validate_blood_pressure(&self, blood_pressure: f64) -> Result<(), ValidationError> {
        self.validate_range("blood_pressure", blood_pressure, self.config.blood_pressure_range)
    }

    /// Validate skin thickness
    pub fn validate_skin_thickness(&self, skin_thickness: f64) -> Result<(), ValidationError> {
        self.validate_range("skin_thickness", skin_thickness, self.config.skin_thickness_range)
    }

    /// Validate insulin level
    pub fn validate_insulin(&self, insulin: f64) -> Result<(), ValidationError> {
        self.validate_range("insulin", insulin, self.config.insulin_range)
    }

    /// Validate BMI
    pub fn validate_bmi(&self, bmi: f64) -> Result<(), ValidationError> {
        self.validate_range("bmi", bmi, self.config.bmi_range)
    }

    /// Validate diabetes pedigree function
    pub fn validate_pedigree(&self, pedigree: f64) -> Result<(), ValidationError> {
        self.validate_range("diabetes_pedigree_function", pedigree, self.config.pedigree_range)
    }

    /// Validate age
    pub fn validate_age(&self, age: u32) -> Result<(), ValidationError> {
        self.validate_count("age", age, self.config.age_range)
    }

    /// Validate every field of a record, collecting all violations
    pub fn validate_record(&self, record: &PatientRecord) -> ValidationResult {
        let checks = [
            self.validate_pregnancies(record.pregnancies),
            self.validate_glucose(record.glucose),
            self.validate_blood_pressure(record.blood_pressure),
            self.validate_skin_thickness(record.skin_thickness),
            self.validate_insulin(record.insulin),
            self.validate_bmi(record.bmi),
            self.validate_pedigree(record.diabetes_pedigree_function),
            self.validate_age(record.age),
        ];
        let fields_checked = checks.len();

        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            warn!("Patient record failed validation: {} violations", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
