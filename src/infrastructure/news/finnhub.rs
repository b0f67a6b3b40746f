use super::sentiment_analyzer::SentimentAnalyzer;
use crate::domain::ports::SentimentProvider;
use crate::domain::sentiment::SentimentScore;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyNewsItem {
    /// Publish time, Unix seconds
    datetime: i64,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
}

/// Scores the first `max_articles` items that have a headline.
pub(crate) fn score_articles(
    analyzer: &SentimentAnalyzer,
    items: &[CompanyNewsItem],
    max_articles: usize,
) -> Vec<SentimentScore> {
    items
        .iter()
        .filter(|item| !item.headline.trim().is_empty())
        .take(max_articles)
        .filter_map(|item| {
            let date = DateTime::from_timestamp(item.datetime, 0)?.date_naive();
            let score = analyzer.analyze_news(&item.headline, &item.summary);
            debug!("News {} [{:.3}]: {}", date, score, item.headline);
            Some(SentimentScore::new(date, score))
        })
        .collect()
}

/// Company news from Finnhub, scored locally with VADER.
pub struct FinnhubSentimentProvider {
    client: ClientWithMiddleware,
    analyzer: SentimentAnalyzer,
    api_key: String,
    base_url: String,
    lookback_days: u32,
    max_articles: usize,
}

impl FinnhubSentimentProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        lookback_days: u32,
        max_articles: usize,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout_secs, max_retries),
            analyzer: SentimentAnalyzer::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            lookback_days,
            max_articles,
        }
    }
}

#[async_trait]
impl SentimentProvider for FinnhubSentimentProvider {
    async fn get_sentiment(&self, symbol: &str) -> Result<Vec<SentimentScore>> {
        if self.api_key.is_empty() {
            anyhow::bail!("FINNHUB_API_KEY is not set");
        }

        let to = Utc::now().date_naive();
        let from = to
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .context("News window start is out of range")?;
        let from_str = from.format("%Y-%m-%d").to_string();
        let to_str = to.format("%Y-%m-%d").to_string();

        let url = build_url_with_query(
            &format!("{}/company-news", self.base_url),
            &[
                ("symbol", symbol),
                ("from", from_str.as_str()),
                ("to", to_str.as_str()),
                ("token", self.api_key.as_str()),
            ],
        );

        info!("Fetching company news for {} from Finnhub...", symbol);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to Finnhub")?;

        if !response.status().is_success() {
            anyhow::bail!("Finnhub API returned status: {}", response.status());
        }

        let items: Vec<CompanyNewsItem> = response
            .json()
            .await
            .context("Failed to parse Finnhub company news")?;

        let scores = score_articles(&self.analyzer, &items, self.max_articles);
        info!(
            "Finnhub: scored {} of {} articles for {}",
            scores.len(),
            items.len(),
            symbol
        );
        Ok(scores)
    }

    fn name(&self) -> &str {
        "Finnhub"
    }
}
