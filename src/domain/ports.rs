use crate::domain::sentiment::SentimentScore;
use crate::domain::types::PriceBar;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Daily bars covering the last `days` calendar days, ascending by date.
    ///
    /// An empty vector is a valid answer; the caller treats it as
    /// insufficient data.
    async fn get_history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Recent news sentiment for `symbol`. May be empty.
    async fn get_sentiment(&self, symbol: &str) -> Result<Vec<SentimentScore>>;

    fn name(&self) -> &str;
}
