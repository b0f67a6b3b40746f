//! Daily aggregates from the Massive (Polygon-compatible) REST API.

use crate::domain::ports::HistoryProvider;
use crate::domain::types::PriceBar;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct AggregatesResponse {
    #[serde(default)]
    results: Option<Vec<Aggregate>>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    /// Bar start, Unix milliseconds
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

impl AggregatesResponse {
    fn into_bars(self) -> Vec<PriceBar> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                let date = DateTime::from_timestamp_millis(a.t)?.date_naive();
                Some(PriceBar::new(date, a.o, a.h, a.l, a.c, a.v))
            })
            .collect()
    }
}

pub struct MassiveHistoryProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl MassiveHistoryProvider {
    pub fn new(api_key: String, base_url: String, timeout_secs: u64, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout_secs, max_retries),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn aggregates_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> String {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            symbol,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        build_url_with_query(
            &url,
            &[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "5000"),
                ("apiKey", self.api_key.as_str()),
            ],
        )
    }
}

#[async_trait]
impl HistoryProvider for MassiveHistoryProvider {
    async fn get_history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>> {
        if self.api_key.is_empty() {
            anyhow::bail!("MASSIVE_API_KEY is not set");
        }

        let to = Utc::now().date_naive();
        let from = to
            .checked_sub_days(Days::new(u64::from(days)))
            .context("History window start is out of range")?;
        info!("Fetching {} daily bars from Massive ({} to {})", symbol, from, to);

        let response = self
            .client
            .get(self.aggregates_url(symbol, from, to))
            .send()
            .await
            .context("Failed to send request to Massive")?;

        if !response.status().is_success() {
            anyhow::bail!("Massive API returned status: {}", response.status());
        }

        let body: AggregatesResponse = response
            .json()
            .await
            .context("Failed to parse Massive aggregates response")?;

        if body.results.is_none() {
            warn!(
                "Massive returned no results for {} (status {:?})",
                symbol, body.status
            );
        }
        let bars = body.into_bars();
        info!("Massive: {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }

    fn name(&self) -> &str {
        "Massive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregates() {
        let json = r#"{
            "ticker": "AAPL",
            "status": "OK",
            "resultsCount": 2,
            "results": [
                {"v": 1000.0, "vw": 101.1, "o": 100.0, "c": 101.0, "h": 102.0, "l": 99.0, "t": 1735707600000, "n": 10},
                {"v": 1200.0, "vw": 102.0, "o": 101.0, "c": 103.0, "h": 104.0, "l": 100.5, "t": 1735794000000, "n": 12}
            ]
        }"#;
        let body: AggregatesResponse = serde_json::from_str(json).unwrap();
        let bars = body.into_bars();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(bars[1].close, 103.0);
        assert_eq!(bars[1].volume, 1200.0);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let body: AggregatesResponse =
            serde_json::from_str(r#"{"status": "OK", "resultsCount": 0}"#).unwrap();
        assert!(body.into_bars().is_empty());
    }

    #[test]
    fn test_aggregates_url() {
        let provider = MassiveHistoryProvider::new(
            "KEY".to_string(),
            "https://api.massive.com/".to_string(),
            5,
            0,
        );
        let url = provider.aggregates_url(
            "AAPL",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        assert_eq!(
            url,
            "https://api.massive.com/v2/aggs/ticker/AAPL/range/1/day/2025-01-01/2025-03-31\
             ?adjusted=true&sort=asc&limit=5000&apiKey=KEY"
        );
    }
}
