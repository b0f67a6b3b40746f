use crate::domain::ports::{HistoryProvider, SentimentProvider};
use crate::domain::sentiment::SentimentScore;
use crate::domain::types::PriceBar;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// In-memory history keyed by upper-case symbol.
#[derive(Debug, Clone, Default)]
pub struct MockHistoryProvider {
    bars: HashMap<String, Vec<PriceBar>>,
    fail: bool,
}

impl MockHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose every request fails.
    pub fn failing() -> Self {
        Self {
            bars: HashMap::new(),
            fail: true,
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_uppercase(), bars);
        self
    }

    /// `count` consecutive daily bars at a constant `price`.
    pub fn with_flat(self, symbol: &str, start: NaiveDate, count: usize, price: f64) -> Self {
        self.with_trend(symbol, start, count, price, 0.0)
    }

    /// `count` consecutive daily bars whose close moves by `step` per day.
    pub fn with_trend(
        self,
        symbol: &str,
        start: NaiveDate,
        count: usize,
        start_price: f64,
        step: f64,
    ) -> Self {
        let bars = daily_series(start, count, |i| start_price + step * i as f64);
        self.with_bars(symbol, bars)
    }
}

/// Daily flat bars with volume 1,000,000 and closes from `price(i)`.
pub fn daily_series(start: NaiveDate, count: usize, price: impl Fn(usize) -> f64) -> Vec<PriceBar> {
    (0..count)
        .filter_map(|i| {
            let date = start.checked_add_days(Days::new(i as u64))?;
            Some(PriceBar::flat(date, price(i), 1_000_000.0))
        })
        .collect()
}

#[async_trait]
impl HistoryProvider for MockHistoryProvider {
    async fn get_history(&self, symbol: &str, _days: u32) -> Result<Vec<PriceBar>> {
        if self.fail {
            anyhow::bail!("Mock history provider failure for {}", symbol);
        }
        Ok(self
            .bars
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockSentimentProvider {
    scores: Vec<SentimentScore>,
    fail: bool,
}

impl MockSentimentProvider {
    /// No news at all.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            scores: Vec::new(),
            fail: true,
        }
    }

    pub fn with_scores(scores: Vec<SentimentScore>) -> Self {
        Self {
            scores,
            fail: false,
        }
    }
}

#[async_trait]
impl SentimentProvider for MockSentimentProvider {
    async fn get_sentiment(&self, symbol: &str) -> Result<Vec<SentimentScore>> {
        if self.fail {
            anyhow::bail!("Mock sentiment provider failure for {}", symbol);
        }
        Ok(self.scores.clone())
    }

    fn name(&self) -> &str {
        "MockNews"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_history() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let provider = MockHistoryProvider::new().with_trend("aapl", start, 5, 100.0, 1.0);

        let bars = provider.get_history("AAPL", 90).await.unwrap();
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[4].close, 104.0);
        assert!(provider.get_history("MSFT", 90).await.unwrap().is_empty());
        assert!(MockHistoryProvider::failing().get_history("AAPL", 90).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_sentiment() {
        assert!(MockSentimentProvider::neutral().get_sentiment("AAPL").await.unwrap().is_empty());
        assert!(MockSentimentProvider::failing().get_sentiment("AAPL").await.is_err());
    }
}
