//! Configuration module for finassist.
//!
//! Structured configuration loading from environment variables, split into
//! model settings and data provider settings.

mod model_config;
mod provider_config;

pub use model_config::ModelEnvConfig;
pub use provider_config::{FinnhubConfig, MassiveConfig, ProviderEnvConfig};

use crate::application::forecast::engine::{ForecastSettings, RuntimeConfig};
use crate::application::market_data::feature_builder::FeatureConfig;
use crate::application::ml::sequence_model::LstmConfig;
use crate::application::ml::tree_model::GradientBoostingConfig;
use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub providers: ProviderEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let providers = ProviderEnvConfig::from_env().context("Failed to load provider config")?;
        Ok(Self { model, providers })
    }

    /// Validated engine settings derived from the model config.
    pub fn to_forecast_settings(&self) -> Result<ForecastSettings> {
        let m = &self.model;
        let settings = ForecastSettings {
            features: FeatureConfig {
                sma_window: m.sma_window,
                rsi_window: m.rsi_window,
                macd_fast: m.macd_fast,
                macd_slow: m.macd_slow,
                macd_signal: m.macd_signal,
                ..FeatureConfig::default()
            },
            sequence: LstmConfig {
                units: m.lstm_units,
                epochs: m.lstm_epochs,
                batch_size: m.lstm_batch_size,
                learning_rate: m.lstm_learning_rate,
                ..LstmConfig::default()
            },
            tree: GradientBoostingConfig {
                n_estimators: m.gbm_trees,
                max_depth: m.gbm_max_depth,
                learning_rate: m.gbm_learning_rate,
                subsample: m.gbm_subsample,
                ..GradientBoostingConfig::default()
            },
            runtime: RuntimeConfig {
                worker_threads: m.worker_threads,
            },
            history_days: m.history_days,
            max_horizon_days: m.max_horizon_days,
            ..ForecastSettings::default()
        }
        .with_seed(m.seed);
        settings
            .validate()
            .context("Invalid forecast settings")?;
        Ok(settings)
    }
}
