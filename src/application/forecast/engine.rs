//! Blocking forecast core: features, scalers, training and rollout for one request.

use crate::application::market_data::feature_builder::{FeatureBuilder, FeatureConfig, FeatureFrame};
use crate::application::ml::assembler::{ForecastAssembler, MODEL_NAME};
use crate::application::ml::model_pair::TrainedModelPair;
use crate::application::ml::scaler::{MinMaxScaler, ScalerPair};
use crate::application::ml::sequence_model::LstmConfig;
use crate::application::ml::tree_model::GradientBoostingConfig;
use crate::domain::errors::ForecastError;
use crate::domain::sentiment::SentimentScore;
use crate::domain::types::{ForecastResult, PriceBar, round_price};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Size of the request-local numeric worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { worker_threads: 1 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub features: FeatureConfig,
    pub sequence: LstmConfig,
    pub tree: GradientBoostingConfig,
    pub runtime: RuntimeConfig,
    /// Calendar days of history requested from the provider.
    pub history_days: u32,
    pub max_horizon_days: usize,
    pub target_range: (f64, f64),
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            sequence: LstmConfig::default(),
            tree: GradientBoostingConfig::default(),
            runtime: RuntimeConfig::default(),
            history_days: 90,
            max_horizon_days: 365,
            target_range: (0.0, 1.0),
        }
    }
}

impl ForecastSettings {
    /// Uses `seed` for both learners.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sequence.seed = seed;
        self.tree.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        self.features.validate()?;
        self.sequence.validate()?;
        self.tree.validate()?;
        MinMaxScaler::new(self.target_range)?;
        if self.runtime.worker_threads == 0 {
            return Err(ForecastError::invalid("worker_threads must be > 0"));
        }
        if self.history_days == 0 {
            return Err(ForecastError::invalid("history_days must be > 0"));
        }
        Ok(())
    }
}

/// Per-request hybrid forecaster. Holds configuration only; every call
/// trains its own models and drops them before returning.
pub struct HybridForecastEngine {
    settings: ForecastSettings,
    features: FeatureBuilder,
}

impl HybridForecastEngine {
    pub fn new(settings: ForecastSettings) -> Result<Self, ForecastError> {
        settings.validate()?;
        let features = FeatureBuilder::new(settings.features.clone())?;
        Ok(Self { settings, features })
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Fewest bars that produce a trainable feature row.
    pub fn min_bars(&self) -> usize {
        self.settings.features.min_bars()
    }

    pub fn forecast(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        sentiment: &[SentimentScore],
        horizon_days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        if horizon_days > self.settings.max_horizon_days {
            return Err(ForecastError::invalid(format!(
                "horizon of {} days exceeds the maximum of {}",
                horizon_days, self.settings.max_horizon_days
            )));
        }

        let frame = self.features.build(symbol, bars, sentiment)?;
        let (Some(last_date), Some(current_price)) = (frame.last_date(), frame.last_close()) else {
            return Err(ForecastError::InsufficientData {
                symbol: symbol.to_string(),
                available: 0,
                required: self.settings.features.min_rows,
            });
        };
        info!(
            "Forecasting {} for {} days from {} feature rows (last close {:.2} on {})",
            symbol,
            horizon_days,
            frame.len(),
            current_price,
            last_date
        );

        if horizon_days == 0 {
            debug!("Zero horizon for {}, skipping training", symbol);
            return Ok(ForecastResult {
                symbol: symbol.to_string(),
                current_price: round_price(current_price),
                forecast: Vec::new(),
                model_name: MODEL_NAME.to_string(),
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.runtime.worker_threads)
            .build()
            .map_err(|e| ForecastError::training("worker pool", e))?;

        pool.install(|| {
            self.train_and_roll(symbol, &frame, last_date, current_price, horizon_days)
        })
    }

    fn train_and_roll(
        &self,
        symbol: &str,
        frame: &FeatureFrame,
        last_date: NaiveDate,
        current_price: f64,
        horizon_days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        let x = frame.feature_matrix();
        let y = frame.target_column();
        let (scalers, x_scaled, y_scaled) = ScalerPair::fit(&x, &y, self.settings.target_range)?;

        let models = TrainedModelPair::train(
            &x_scaled,
            &y_scaled,
            &self.settings.sequence,
            &self.settings.tree,
        )?;

        // Feature rows are non-empty here, so the scaled matrix has a last row.
        let last_row = x_scaled.row(x_scaled.nrows() - 1);
        let scaled = models.forecaster().rollout(last_row, horizon_days)?;

        let result = ForecastAssembler::new(&scalers.target).assemble(
            symbol,
            current_price,
            &scaled,
            last_date,
        )?;

        info!(
            "Forecast for {} complete: {} points, last {:?}",
            symbol,
            result.forecast.len(),
            result.forecast.last().map(|p| p.predicted_price)
        );
        Ok(result)
    }
}
