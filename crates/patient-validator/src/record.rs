//! Patient Record Type

use serde::{Deserialize, Serialize};

/// Raw clinical measurements for a single patient
///
/// Field units follow the intake form: glucose in mg/dL, blood pressure in
/// mm Hg, skin thickness in mm, insulin in IU/mL, age in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Number of pregnancies
    pub pregnancies: u32,
    /// Plasma glucose concentration (mg/dL)
    pub glucose: f64,
    /// Diastolic blood pressure (mm Hg)
    pub blood_pressure: f64,
    /// Triceps skin fold thickness (mm)
    pub skin_thickness: f64,
    /// 2-hour serum insulin (IU/mL)
    pub insulin: f64,
    /// Body mass index
    pub bmi: f64,
    /// Diabetes pedigree function
    pub diabetes_pedigree_function: f64,
    /// Age (years)
    pub age: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_round_trip() {
        let record = PatientRecord {
            pregnancies: 1,
            glucose: 120.0,
            blood_pressure: 70.0,
            skin_thickness: 20.0,
            insulin: 80.0,
            bmi: 25.0,
            diabetes_pedigree_function: 0.5,
            age: 30,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: PatientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_rejects_missing_field() {
        let json = r#"{"pregnancies": 1, "glucose": 120.0}"#;
        assert!(serde_json::from_str::<PatientRecord>(json).is_err());
    }
}
