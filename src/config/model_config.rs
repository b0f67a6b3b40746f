//! Forecast model configuration parsing from environment variables.
//!
//! Covers history window, horizon limit, seeds, worker threads, both learners'
//! hyperparameters and the indicator windows.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    // Request
    pub history_days: u32,
    pub max_horizon_days: usize,
    pub seed: u64,
    pub worker_threads: usize,

    // Sequence model
    pub lstm_units: usize,
    pub lstm_epochs: usize,
    pub lstm_batch_size: usize,
    pub lstm_learning_rate: f64,

    // Tree ensemble
    pub gbm_trees: usize,
    pub gbm_max_depth: u16,
    pub gbm_learning_rate: f64,
    pub gbm_subsample: f64,

    // Features
    pub sma_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            history_days: parse_env("FORECAST_HISTORY_DAYS", 90u32)?,
            max_horizon_days: parse_env("FORECAST_MAX_HORIZON_DAYS", 365usize)?,
            seed: parse_env("FORECAST_SEED", 42u64)?,
            worker_threads: parse_env("FORECAST_WORKER_THREADS", 1usize)?,

            lstm_units: parse_env("LSTM_UNITS", 64usize)?,
            lstm_epochs: parse_env("LSTM_EPOCHS", 10usize)?,
            lstm_batch_size: parse_env("LSTM_BATCH_SIZE", 8usize)?,
            lstm_learning_rate: parse_env("LSTM_LEARNING_RATE", 0.001f64)?,

            gbm_trees: parse_env("GBM_TREES", 80usize)?,
            gbm_max_depth: parse_env("GBM_MAX_DEPTH", 6u16)?,
            gbm_learning_rate: parse_env("GBM_LEARNING_RATE", 0.3f64)?,
            gbm_subsample: parse_env("GBM_SUBSAMPLE", 1.0f64)?,

            sma_window: parse_env("FEATURE_SMA_WINDOW", 10usize)?,
            rsi_window: parse_env("FEATURE_RSI_WINDOW", 14usize)?,
            macd_fast: parse_env("FEATURE_MACD_FAST", 12usize)?,
            macd_slow: parse_env("FEATURE_MACD_SLOW", 26usize)?,
            macd_signal: parse_env("FEATURE_MACD_SIGNAL", 9usize)?,
        })
    }
}

/// Reads `key` as `T`, falling back to `default` when unset.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse::<T>()
        .context(format!("Failed to parse {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelEnvConfig::from_env().expect("Should parse with defaults");
        assert_eq!(config.history_days, 90);
        assert_eq!(config.max_horizon_days, 365);
        assert_eq!(config.seed, 42);
        assert_eq!(config.lstm_units, 64);
        assert_eq!(config.gbm_trees, 80);
        assert_eq!(config.macd_slow, 26);
    }

    #[test]
    fn test_parse_env_reports_key() {
        // SAFETY: this key is only touched by this test.
        unsafe { env::set_var("FINASSIST_TEST_BAD_NUMBER", "twelve") };
        let err = parse_env("FINASSIST_TEST_BAD_NUMBER", 12usize).unwrap_err();
        assert!(err.to_string().contains("FINASSIST_TEST_BAD_NUMBER"));
        unsafe { env::remove_var("FINASSIST_TEST_BAD_NUMBER") };
    }
}
