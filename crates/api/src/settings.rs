//! Runtime Settings

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server and artifact configuration
///
/// Loaded from `config/default.toml` when present, overridden by
/// `SCREENING_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Path to the fitted scaler artifact
    pub scaler_path: String,
    /// Path to the fitted classifier artifact
    pub model_path: String,
    /// Maximum prediction history rows kept in memory
    pub history_retention: usize,
    /// Rate limit replenish interval (seconds per request)
    pub rate_limit_per_second: u64,
    /// Rate limit burst size
    pub rate_limit_burst: u32,
}

impl Settings {
    /// Load settings from defaults, file, then environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("scaler_path", "artifacts/scaler.json")?
            .set_default("model_path", "artifacts/model.json")?
            .set_default("history_retention", 10_000i64)?
            .set_default("rate_limit_per_second", 1i64)?
            .set_default("rate_limit_burst", 10i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("SCREENING"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_config_file() {
        let settings = Settings::load().unwrap();
        assert!(!settings.bind_addr.is_empty());
        assert!(settings.history_retention > 0);
        assert!(settings.rate_limit_burst > 0);
    }
}
