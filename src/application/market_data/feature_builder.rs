use crate::application::market_data::indicators::{MacdHistogram, WarmSma, WilderRsi};
use crate::domain::errors::ForecastError;
use crate::domain::ml::{ColumnTarget, FEATURE_COUNT, FEATURE_NAMES, FeatureRow};
use crate::domain::sentiment::{SentimentScore, daily_average};
use crate::domain::types::PriceBar;
use chrono::NaiveDate;
use ndarray::Array2;
use tracing::{debug, warn};

const LAG_DEPTH: usize = 3;

/// Indicator windows used to turn daily bars into feature rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub sma_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Fewest usable rows a request may train on.
    pub min_rows: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sma_window: 10,
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            min_rows: 1,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        let windows = [
            ("sma_window", self.sma_window),
            ("rsi_window", self.rsi_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("min_rows", self.min_rows),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, v)| *v == 0) {
            return Err(ForecastError::invalid(format!("{} must be > 0", name)));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ForecastError::invalid(format!(
                "macd_fast ({}) must be < macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }

    /// Shortest history that yields exactly one feature row.
    pub fn min_bars(&self) -> usize {
        [
            self.sma_window,
            self.rsi_window + 1,
            self.macd_slow + self.macd_signal - 1,
            LAG_DEPTH + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(LAG_DEPTH + 1)
    }
}

/// Warm feature rows with their same-step close targets and dates.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub dates: Vec<NaiveDate>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, FEATURE_COUNT)` in registry column order.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let flat: Vec<f64> = self.rows.iter().flat_map(|r| r.to_vector()).collect();
        Array2::from_shape_vec((self.rows.len(), FEATURE_COUNT), flat)
            .unwrap_or_else(|_| Array2::zeros((0, FEATURE_COUNT)))
    }

    pub fn target_column(&self) -> ColumnTarget {
        ColumnTarget::from_values(&self.targets)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.targets.last().copied()
    }
}

pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Builds the feature frame for an ascending daily history.
    ///
    /// Sentiment is left-joined by calendar date; dates without a score get 0.
    /// Bars with a non-finite close or volume are skipped before they reach
    /// the indicators. Rows where any indicator is still warming up are
    /// dropped.
    pub fn build(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        sentiment: &[SentimentScore],
    ) -> Result<FeatureFrame, ForecastError> {
        if bars.is_empty() {
            return Err(ForecastError::InsufficientData {
                symbol: symbol.to_string(),
                available: 0,
                required: self.config.min_rows,
            });
        }

        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::upstream(
                "history",
                format!(
                    "bars for {} are not strictly ascending: {} followed by {}",
                    symbol, w[0].date, w[1].date
                ),
            ));
        }

        let total = bars.len();
        let bars: Vec<&PriceBar> = bars
            .iter()
            .filter(|b| b.close.is_finite() && b.volume.is_finite())
            .collect();
        if bars.len() < total {
            warn!(
                "FeatureBuilder: skipped {} bars with non-finite close or volume for {}",
                total - bars.len(),
                symbol
            );
        }

        let daily_sentiment = daily_average(sentiment);

        let mut sma = WarmSma::new(self.config.sma_window)?;
        let mut rsi = WilderRsi::new(self.config.rsi_window)?;
        let mut macd = MacdHistogram::new(
            self.config.macd_fast,
            self.config.macd_slow,
            self.config.macd_signal,
        )?;

        let mut frame = FeatureFrame {
            rows: Vec::new(),
            targets: Vec::new(),
            dates: Vec::new(),
        };

        for (i, bar) in bars.iter().enumerate() {
            // Every indicator must see every bar, even before the row is usable.
            let sma_value = sma.next(bar.close);
            let rsi_value = rsi.next(bar.close);
            let macd_value = macd.next(bar.close);

            if i < LAG_DEPTH {
                continue;
            }
            let (Some(sma), Some(rsi), Some(macd)) = (sma_value, rsi_value, macd_value) else {
                continue;
            };

            let row = FeatureRow {
                sma,
                rsi,
                macd,
                lag_1: bars[i - 1].close,
                lag_2: bars[i - 2].close,
                lag_3: bars[i - 3].close,
                volume: bar.volume,
                sentiment_score: daily_sentiment.get(&bar.date).copied().unwrap_or(0.0),
            };
            if !row.is_finite() {
                continue;
            }

            frame.rows.push(row);
            frame.targets.push(bar.close);
            frame.dates.push(bar.date);
        }

        debug!(
            "FeatureBuilder: {} bars -> {} rows for {} {:?}",
            total,
            frame.len(),
            symbol,
            FEATURE_NAMES
        );

        if frame.len() < self.config.min_rows {
            return Err(ForecastError::InsufficientData {
                symbol: symbol.to_string(),
                available: frame.len(),
                required: self.config.min_rows,
            });
        }

        Ok(frame)
    }
}
