//! Prediction Route

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use inference_engine::{InferenceError, RiskLabel};
use patient_validator::PatientRecord;
use serde::Serialize;
use std::sync::Arc;
use storage::PredictionRecord;
use tracing::{debug, error, warn};

use crate::AppState;

/// Response for a successful prediction
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Hard model output: 0 or 1
    pub label: u8,
    /// Positive-class probability
    pub probability: f64,
    /// Short verdict string
    pub verdict: &'static str,
    /// Patient-facing guidance
    pub guidance: &'static str,
}

/// Error body for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl ErrorResponse {
    fn plain(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            violations: Vec::new(),
        }
    }
}

/// Run one patient record through the pipeline
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PatientRecord>,
) -> Response {
    // Report every violation at once; the assembler alone would stop at the
    // first.
    let validation = state.assembler.validator().validate_record(&record);
    if !validation.valid {
        warn!(
            "Rejected prediction request: {}/{} fields invalid",
            validation.errors.len(),
            validation.fields_checked
        );
        let body = ErrorResponse {
            error: "invalid patient record".to_string(),
            violations: validation.errors.iter().map(ToString::to_string).collect(),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let features = match state.assembler.assemble(&record) {
        Ok(features) => features,
        Err(e) => {
            let body = ErrorResponse {
                error: "invalid patient record".to_string(),
                violations: vec![e.to_string()],
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    match state.engine.predict(&features) {
        Ok(result) => {
            let prediction = result.prediction;

            if let Err(e) = state.repository.insert_prediction(PredictionRecord {
                id: 0,
                created_at: Utc::now(),
                label: prediction.label.as_str().to_string(),
                probability: prediction.probability,
                patient: record,
            }) {
                warn!("Failed to record prediction: {}", e);
            }

            debug!("Prediction served in {}us", result.latency_us);
            let verdict = match prediction.label {
                RiskLabel::Diabetic => "likely diabetic",
                RiskLabel::NotDiabetic => "not diabetic",
            };
            let body = PredictResponse {
                label: prediction.label.as_u8(),
                probability: prediction.probability,
                verdict,
                guidance: prediction.label.guidance(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(InferenceError::ModelUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::plain("model artifacts not loaded")),
        )
            .into_response(),
        Err(e) => {
            error!("Inference failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::plain(e.to_string())),
            )
                .into_response()
        }
    }
}
