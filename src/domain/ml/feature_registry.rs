use serde::{Deserialize, Serialize};

/// Ordered list of feature names.
/// This order MUST match `FeatureRow::to_vector`; the recursive rollout
/// writes into the last position of this layout.
pub const FEATURE_NAMES: &[&str] = &[
    "sma",
    "rsi",
    "macd",
    "lag_1",
    "lag_2",
    "lag_3",
    "volume",
    "sentiment_score",
];

pub const FEATURE_COUNT: usize = 8;

/// One fully-defined row of model inputs for a single trading day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureRow {
    pub sma: f64,
    pub rsi: f64,
    pub macd: f64,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub volume: f64,
    pub sentiment_score: f64,
}

impl FeatureRow {
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sma,
            self.rsi,
            self.macd,
            self.lag_1,
            self.lag_2,
            self.lag_3,
            self.volume,
            self.sentiment_score,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_consistency() {
        let row = FeatureRow {
            sma: 1.0,
            rsi: 2.0,
            macd: 3.0,
            lag_1: 4.0,
            lag_2: 5.0,
            lag_3: 6.0,
            volume: 7.0,
            sentiment_score: 8.0,
        };

        let vec = row.to_vector();
        // SMA is index 0
        assert_eq!(vec[0], 1.0);
        // Sentiment is the last index (7)
        assert_eq!(vec[7], 8.0);
        assert!(row.is_finite());
    }
}
