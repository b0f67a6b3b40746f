use super::engine::{ForecastSettings, HybridForecastEngine};
use crate::domain::errors::ForecastError;
use crate::domain::ports::{HistoryProvider, SentimentProvider};
use crate::domain::sentiment::{SentimentLabel, SentimentScore};
use crate::domain::types::ForecastResult;
use crate::domain::validation::PriceBarValidator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Async entry point: fetches inputs from the providers and runs the blocking
/// engine on tokio's blocking pool.
pub struct ForecastService {
    history: Arc<dyn HistoryProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    engine: Arc<HybridForecastEngine>,
}

impl ForecastService {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        settings: ForecastSettings,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            history,
            sentiment,
            engine: Arc::new(HybridForecastEngine::new(settings)?),
        })
    }

    pub async fn forecast(
        &self,
        symbol: &str,
        horizon_days: usize,
    ) -> Result<ForecastResult, ForecastError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ForecastError::invalid("symbol must not be empty"));
        }
        let max_horizon = self.engine.settings().max_horizon_days;
        if horizon_days > max_horizon {
            return Err(ForecastError::invalid(format!(
                "horizon of {} days exceeds the maximum of {}",
                horizon_days, max_horizon
            )));
        }

        let days = self.engine.settings().history_days;
        let (history, sentiment) = tokio::join!(
            self.history.get_history(&symbol, days),
            self.sentiment.get_sentiment(&symbol)
        );

        let raw_bars = history.map_err(|e| {
            ForecastError::upstream(self.history.name(), format!("{:#}", e))
        })?;
        let fetched = raw_bars.len();
        let bars = PriceBarValidator::sanitize(&symbol, raw_bars);
        if bars.len() < fetched {
            warn!(
                "ForecastService: dropped {} invalid or duplicate bars for {}",
                fetched - bars.len(),
                symbol
            );
        }

        let sentiment = match sentiment {
            Ok(scores) => scores,
            Err(e) => {
                warn!(
                    "ForecastService: sentiment from {} unavailable for {}, using neutral: {:#}",
                    self.sentiment.name(),
                    symbol,
                    e
                );
                Vec::new()
            }
        };
        log_sentiment(&symbol, &sentiment);

        info!(
            "ForecastService: {} bars from {} for {}, horizon {}",
            bars.len(),
            self.history.name(),
            symbol,
            horizon_days
        );

        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.forecast(&symbol, &bars, &sentiment, horizon_days))
            .await
            .map_err(|e| ForecastError::training("forecast worker", e))?
    }
}

fn log_sentiment(symbol: &str, scores: &[SentimentScore]) {
    if scores.is_empty() {
        return;
    }
    let mean = scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64;
    info!(
        "ForecastService: {} news scores for {}, mean {:.3} ({})",
        scores.len(),
        symbol,
        mean,
        SentimentLabel::from_score(mean)
    );
    if let Some(latest) = scores.iter().max_by_key(|s| s.date) {
        debug!(
            "ForecastService: latest sentiment for {} on {}: {:.3} ({})",
            symbol,
            latest.date,
            latest.score,
            latest.label()
        );
    }
}
