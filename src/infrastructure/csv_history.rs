use crate::domain::ports::HistoryProvider;
use crate::domain::types::PriceBar;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads `{dir}/{SYMBOL}.csv` with a `date,open,high,low,close,volume` header.
pub struct CsvHistoryProvider {
    dir: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        if symbol.is_empty()
            || !symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            || symbol.starts_with('.')
        {
            anyhow::bail!("Invalid symbol for CSV lookup: {:?}", symbol);
        }
        Ok(self.dir.join(format!("{}.csv", symbol)))
    }
}

fn parse_bars(content: &str) -> Result<Vec<PriceBar>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    reader
        .deserialize::<CsvBar>()
        .enumerate()
        .map(|(i, record)| -> Result<PriceBar> {
            let r = record.with_context(|| format!("Malformed CSV row {}", i + 1))?;
            Ok(PriceBar::new(r.date, r.open, r.high, r.low, r.close, r.volume))
        })
        .collect()
}

/// Bars dated within `days` calendar days of the newest bar.
fn recent_window(bars: Vec<PriceBar>, days: u32) -> Vec<PriceBar> {
    let Some(newest) = bars.iter().map(|b| b.date).max() else {
        return bars;
    };
    let cutoff = newest
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    bars.into_iter().filter(|b| b.date >= cutoff).collect()
}

#[async_trait]
impl HistoryProvider for CsvHistoryProvider {
    async fn get_history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>> {
        let path = self.path_for(symbol)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let bars = recent_window(parse_bars(&content)?, days);
        info!("CSV: {} bars for {} from {}", bars.len(), symbol, path.display());
        Ok(bars)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "date,open,high,low,close,volume\n\
        2025-01-01,100,101,99,100.5,1000\n\
        2025-01-02,100.5,102,100,101.5,1100\n\
        2025-01-10,101.5,103,101,102.5,900\n";

    #[tokio::test]
    async fn test_reads_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("AAPL.csv")).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let provider = CsvHistoryProvider::new(dir.path());
        let bars = provider.get_history("AAPL", 90).await.unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[2].close, 102.5);

        let recent = provider.get_history("AAPL", 8).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvHistoryProvider::new(dir.path());
        assert!(provider.get_history("MSFT", 90).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_path_like_symbols() {
        let provider = CsvHistoryProvider::new("/tmp");
        assert!(provider.get_history("../etc/passwd", 90).await.is_err());
    }

    #[test]
    fn test_malformed_row_is_error() {
        let bad = "date,open,high,low,close,volume\n2025-01-01,abc,1,1,1,1\n";
        assert!(parse_bars(bad).is_err());
    }
}
