//! Prediction History Repository

use crate::StorageError;
use chrono::{DateTime, Utc};
use patient_validator::PatientRecord;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// Stored prediction row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Assigned on insert, monotonically increasing
    pub id: i64,
    /// Time the prediction was served
    pub created_at: DateTime<Utc>,
    /// Risk label string ("diabetic" / "not_diabetic")
    pub label: String,
    /// Positive-class probability
    pub probability: f64,
    /// Raw measurements the prediction was made from
    pub patient: PatientRecord,
}

/// Bounded in-memory repository of recent predictions
pub struct Repository {
    predictions: Mutex<Vec<PredictionRecord>>,
    /// Oldest rows are dropped once this many are stored
    max_prediction_records: usize,
    next_prediction_id: Mutex<i64>,
}

impl Repository {
    /// Create a repository with the default retention window
    pub fn new() -> Self {
        Self::with_retention(10_000)
    }

    /// Create a repository retaining at most `max_prediction_records` rows
    pub fn with_retention(max_prediction_records: usize) -> Self {
        Self {
            predictions: Mutex::new(Vec::with_capacity(1000.min(max_prediction_records))),
            max_prediction_records: max_prediction_records.max(1),
            next_prediction_id: Mutex::new(1),
        }
    }

    /// Insert a prediction record, assigning its id
    pub fn insert_prediction(&self, mut record: PredictionRecord) -> Result<i64, StorageError> {
        let mut predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        let mut id = self
            .next_prediction_id
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        record.id = *id;
        *id += 1;

        // Enforce retention
        if predictions.len() >= self.max_prediction_records {
            predictions.remove(0);
        }

        let returned_id = record.id;
        predictions.push(record);
        debug!("Inserted prediction with ID {}", returned_id);

        Ok(returned_id)
    }

    /// Get recent predictions, newest first, with an optional label filter
    pub fn get_predictions(
        &self,
        label: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        Ok(predictions
            .iter()
            .rev()
            .filter(|p| label.map_or(true, |l| p.label == l))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Get one prediction by id
    pub fn get_prediction(&self, id: i64) -> Result<PredictionRecord, StorageError> {
        let predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        predictions
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Get total prediction count
    pub fn prediction_count(&self) -> usize {
        self.predictions.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut predictions) = self.predictions.lock() {
            predictions.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, probability: f64) -> PredictionRecord {
        PredictionRecord {
            id: 0,
            created_at: Utc::now(),
            label: label.to_string(),
            probability,
            patient: PatientRecord {
                pregnancies: 1,
                glucose: 120.0,
                blood_pressure: 70.0,
                skin_thickness: 20.0,
                insulin: 80.0,
                bmi: 25.0,
                diabetes_pedigree_function: 0.5,
                age: 30,
            },
        }
    }

    #[test]
    fn test_insert_and_retrieve() {
        let repo = Repository::new();

        let id = repo.insert_prediction(record("diabetic", 0.82)).unwrap();
        assert_eq!(id, 1);

        let rows = repo.get_predictions(None, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "diabetic");
        assert_eq!(rows[0].patient.glucose, 120.0);
    }

    #[test]
    fn test_newest_first_and_label_filter() {
        let repo = Repository::new();
        repo.insert_prediction(record("not_diabetic", 0.12)).unwrap();
        repo.insert_prediction(record("diabetic", 0.91)).unwrap();
        repo.insert_prediction(record("diabetic", 0.67)).unwrap();

        let rows = repo.get_predictions(None, 10).unwrap();
        assert_eq!(rows[0].id, 3);

        let diabetic = repo.get_predictions(Some("diabetic"), 10).unwrap();
        assert_eq!(diabetic.len(), 2);
        assert!(diabetic.iter().all(|r| r.label == "diabetic"));
    }

    #[test]
    fn test_retention_drops_oldest() {
        let repo = Repository::with_retention(2);
        repo.insert_prediction(record("diabetic", 0.9)).unwrap();
        repo.insert_prediction(record("diabetic", 0.8)).unwrap();
        repo.insert_prediction(record("diabetic", 0.7)).unwrap();

        assert_eq!(repo.prediction_count(), 2);
        let rows = repo.get_predictions(None, 10).unwrap();
        assert_eq!(rows[0].id, 3);
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn test_get_by_id() {
        let repo = Repository::new();
        let id = repo.insert_prediction(record("not_diabetic", 0.2)).unwrap();

        assert_eq!(repo.get_prediction(id).unwrap().id, id);
        assert!(matches!(repo.get_prediction(999), Err(StorageError::NotFound)));
    }
}
