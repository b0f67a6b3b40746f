//! Close-price indicators with explicit warm-up.
//!
//! The `ta` indicators emit a value from the very first input. The feature
//! builder must instead drop rows until every indicator has seen its full
//! lookback, so each wrapper here returns `None` while still warming up.

use crate::domain::errors::ForecastError;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};

fn invalid_period(name: &str, e: impl std::fmt::Debug) -> ForecastError {
    ForecastError::invalid(format!("invalid {} period: {:?}", name, e))
}

/// Rolling simple moving average, defined once `period` closes were seen.
pub struct WarmSma {
    sma: SimpleMovingAverage,
    period: usize,
    seen: usize,
}

impl WarmSma {
    pub fn new(period: usize) -> Result<Self, ForecastError> {
        Ok(Self {
            sma: SimpleMovingAverage::new(period).map_err(|e| invalid_period("SMA", e))?,
            period,
            seen: 0,
        })
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let value = self.sma.next(close);
        self.seen += 1;
        (self.seen >= self.period).then_some(value)
    }
}

/// RSI with Wilder's smoothing.
///
/// Seeds the average gain/loss with the plain mean of the first `period`
/// changes, then applies `avg = (avg * (n - 1) + x) / n`. Needs `period`
/// price changes, so the first value appears on bar index `period`.
pub struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: f64,
    avg_loss: f64,
    count: usize,
}

impl WilderRsi {
    pub fn new(period: usize) -> Result<Self, ForecastError> {
        if period == 0 {
            return Err(invalid_period("RSI", "period must be > 0"));
        }
        Ok(Self {
            period,
            prev_close: None,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
            count: 0,
        })
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;

        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        self.count += 1;

        let n = self.period as f64;
        if self.count <= self.period {
            self.gain_sum += gain;
            self.loss_sum += loss;
            if self.count < self.period {
                return None;
            }
            self.avg_gain = self.gain_sum / n;
            self.avg_loss = self.loss_sum / n;
        } else {
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }

        // No losses in the window (including a flat series) pins RSI at 100.
        if self.avg_loss == 0.0 {
            return Some(100.0);
        }
        let rs = self.avg_gain / self.avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

/// MACD histogram: `(EMA_fast - EMA_slow) - EMA_signal(macd)`.
///
/// The signal EMA only starts consuming MACD values once the slow EMA has
/// seen `slow` closes, so the first histogram value lands on bar index
/// `slow + signal - 2`.
pub struct MacdHistogram {
    fast: ExponentialMovingAverage,
    slow: ExponentialMovingAverage,
    signal: ExponentialMovingAverage,
    slow_period: usize,
    signal_period: usize,
    seen: usize,
    signal_seen: usize,
}

impl MacdHistogram {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, ForecastError> {
        if fast >= slow {
            return Err(ForecastError::invalid(format!(
                "MACD fast period {} must be shorter than slow period {}",
                fast, slow
            )));
        }
        Ok(Self {
            fast: ExponentialMovingAverage::new(fast).map_err(|e| invalid_period("MACD fast", e))?,
            slow: ExponentialMovingAverage::new(slow).map_err(|e| invalid_period("MACD slow", e))?,
            signal: ExponentialMovingAverage::new(signal)
                .map_err(|e| invalid_period("MACD signal", e))?,
            slow_period: slow,
            signal_period: signal,
            seen: 0,
            signal_seen: 0,
        })
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        self.seen += 1;
        if self.seen < self.slow_period {
            return None;
        }

        let macd = fast - slow;
        let signal = self.signal.next(macd);
        self.signal_seen += 1;
        (self.signal_seen >= self.signal_period).then_some(macd - signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_warmup() {
        let mut sma = WarmSma::new(3).unwrap();
        assert_eq!(sma.next(1.0), None);
        assert_eq!(sma.next(2.0), None);
        assert_eq!(sma.next(3.0), Some(2.0));
        assert_eq!(sma.next(4.0), Some(3.0));
    }

    #[test]
    fn test_rsi_warmup_and_bounds() {
        let mut rsi = WilderRsi::new(14).unwrap();
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();

        let values: Vec<Option<f64>> = closes.iter().map(|c| rsi.next(*c)).collect();
        assert!(values[..14].iter().all(Option::is_none));
        assert!(values[14..].iter().all(Option::is_some));
        for v in values.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let mut rsi = WilderRsi::new(3).unwrap();
        let out: Vec<Option<f64>> = (0..5).map(|_| rsi.next(50.0)).collect();
        assert_eq!(out[3], Some(100.0));
        assert_eq!(out[4], Some(100.0));
    }

    #[test]
    fn test_rsi_falling_series_is_zero() {
        let mut rsi = WilderRsi::new(3).unwrap();
        let mut last = None;
        for i in 0..6 {
            last = rsi.next(100.0 - i as f64);
        }
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn test_macd_histogram_warmup() {
        let mut macd = MacdHistogram::new(12, 26, 9).unwrap();
        let values: Vec<Option<f64>> = (0..40).map(|i| macd.next(100.0 + i as f64)).collect();

        assert!(values[..33].iter().all(Option::is_none));
        assert!(values[33..].iter().all(Option::is_some));
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let mut macd = MacdHistogram::new(3, 6, 2).unwrap();
        let last = (0..20).map(|_| macd.next(42.0)).last().flatten().unwrap();
        assert!(last.abs() < 1e-9);
    }

    #[test]
    fn test_invalid_periods() {
        assert!(WarmSma::new(0).is_err());
        assert!(WilderRsi::new(0).is_err());
        assert!(MacdHistogram::new(26, 12, 9).is_err());
    }
}
