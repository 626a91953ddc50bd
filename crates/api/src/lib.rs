//! Diabetes Risk Screening API Server
//!
//! REST API over the validation, feature assembly, and inference pipeline.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_engine::FeatureAssembler;
use inference_engine::InferenceEngine;
use serde::Serialize;
use std::sync::Arc;
use storage::Repository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod rate_limit;
mod routes;
mod settings;

pub use rate_limit::{create_governor_config, RateLimitConfig};
pub use settings::Settings;

/// Application state shared across handlers
///
/// The engine is armed at startup and read-only afterwards; the repository
/// locks internally. Handlers therefore share the state without an outer lock.
pub struct AppState {
    /// Armed inference engine
    pub engine: InferenceEngine,
    /// Validating feature assembler
    pub assembler: FeatureAssembler,
    /// Prediction history
    pub repository: Repository,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state around an armed engine
    pub fn new(engine: InferenceEngine, repository: Repository) -> Self {
        Self {
            engine,
            assembler: FeatureAssembler::default(),
            repository,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub inference: ComponentHealth,
    pub history: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub detail: Option<String>,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub prediction_count: usize,
    pub feature_count: Option<usize>,
    pub tree_count: Option<usize>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict", post(routes::predict::post_predict))
        .route("/api/v1/predictions", get(routes::predictions::get_predictions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let engine_armed = state.engine.is_loaded();
    let response = HealthResponse {
        status: if engine_armed { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            inference: ComponentHealth {
                status: if engine_armed { "ok" } else { "unavailable" }.to_string(),
                detail: state.engine.n_features().map(|n| format!("{n} features")),
            },
            history: ComponentHealth {
                status: "ok".to_string(),
                detail: None,
            },
        },
        metrics: SystemMetrics {
            prediction_count: state.repository.prediction_count(),
            feature_count: state.engine.n_features(),
            tree_count: state.engine.tree_count(),
        },
    };

    Json(response)
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(
    addr: &str,
    state: Arc<AppState>,
    rate_limit: &RateLimitConfig,
) -> anyhow::Result<()> {
    let governor = create_governor_config(rate_limit);
    let app = create_router(state).layer(tower_governor::GovernorLayer { config: governor });

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use feature_engine::FEATURE_DIMENSION;
    use inference_engine::{GbtClassifier, RiskLabel, Scaler};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let engine = InferenceEngine::from_parts(
            Scaler::identity(FEATURE_DIMENSION),
            GbtClassifier::constant(FEATURE_DIMENSION, RiskLabel::Diabetic),
        )
        .unwrap();
        Arc::new(AppState::new(engine, Repository::new()))
    }

    fn predict_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "pregnancies": 1,
            "glucose": 120.0,
            "blood_pressure": 70.0,
            "skin_thickness": 20.0,
            "insulin": 80.0,
            "bmi": 25.0,
            "diabetes_pedigree_function": 0.5,
            "age": 30
        })
    }

    #[tokio::test]
    async fn test_predict_returns_label_for_valid_record() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["label"], 1);
        assert_eq!(json["verdict"], "likely diabetic");
        let probability = json["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&probability));

        // The served prediction lands in history
        assert_eq!(state.repository.prediction_count(), 1);
    }

    #[tokio::test]
    async fn test_predict_rejects_out_of_domain_record() {
        let app = create_router(test_state());

        let mut body = valid_body();
        body["glucose"] = serde_json::json!(-1.0);
        body["age"] = serde_json::json!(200);

        let response = app.oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["violations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health_reports_armed_engine() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["metrics"]["feature_count"], 10);
    }

    #[tokio::test]
    async fn test_predictions_history_endpoint() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(predict_request(valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/predictions?limit=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["label"], "diabetic");
    }
}
