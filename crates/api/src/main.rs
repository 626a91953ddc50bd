//! Diabetes Risk Screening Pipeline - Main Entry Point

use api::{init_logging, run_server, AppState, RateLimitConfig, Settings};
use inference_engine::InferenceEngine;
use std::sync::Arc;
use storage::Repository;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Diabetes Risk Screening Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    info!(
        "Loading model artifacts: scaler={}, model={}",
        settings.scaler_path, settings.model_path
    );

    // Artifact loading is fatal: the process never serves without both armed.
    let mut engine = InferenceEngine::new(&settings.scaler_path, &settings.model_path);
    engine.load()?;

    let repository = Repository::with_retention(settings.history_retention);
    let state = Arc::new(AppState::new(engine, repository));
    let rate_limit = RateLimitConfig {
        per_second: settings.rate_limit_per_second,
        burst_size: settings.rate_limit_burst,
    };

    run_server(&settings.bind_addr, state, &rate_limit).await
}
