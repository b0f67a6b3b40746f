//! Data provider configuration parsing from environment variables.

use super::model_config::parse_env;
use anyhow::Result;
use std::env;

/// Massive (Polygon-compatible) aggregates API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassiveConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Finnhub company news API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    pub lookback_days: u32,
    pub max_articles: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEnvConfig {
    pub massive: MassiveConfig,
    pub finnhub: FinnhubConfig,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            massive: MassiveConfig {
                api_key: env::var("MASSIVE_API_KEY").unwrap_or_default(),
                base_url: env::var("MASSIVE_BASE_URL")
                    .unwrap_or_else(|_| "https://api.massive.com".to_string()),
            },
            finnhub: FinnhubConfig {
                api_key: env::var("FINNHUB_API_KEY").unwrap_or_default(),
                base_url: env::var("FINNHUB_BASE_URL")
                    .unwrap_or_else(|_| "https://finnhub.io/api/v1".to_string()),
                lookback_days: parse_env("NEWS_LOOKBACK_DAYS", 7u32)?,
                max_articles: parse_env("NEWS_MAX_ARTICLES", 10usize)?,
            },
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 10u64)?,
            http_max_retries: parse_env("HTTP_MAX_RETRIES", 3u32)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderEnvConfig::from_env().expect("Should parse with defaults");
        assert_eq!(config.finnhub.base_url, "https://finnhub.io/api/v1");
        assert_eq!(config.finnhub.lookback_days, 7);
        assert_eq!(config.finnhub.max_articles, 10);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.http_max_retries, 3);
    }
}
