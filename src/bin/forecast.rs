//! finassist forecast - N-day price forecast for one symbol
//!
//! Prints the forecast as JSON on stdout; logs go to stderr.
//!
//! # Usage
//! ```sh
//! cargo run --bin forecast -- AAPL --days 5 --source csv --csv-dir ./data
//! ```

use anyhow::Result;
use chrono::{Days, Utc};
use clap::{Parser, ValueEnum};
use finassist::application::forecast::ForecastService;
use finassist::config::Config;
use finassist::domain::ports::{HistoryProvider, SentimentProvider};
use finassist::infrastructure::mock::daily_series;
use finassist::infrastructure::{
    CsvHistoryProvider, FinnhubSentimentProvider, MassiveHistoryProvider, MockHistoryProvider,
    MockSentimentProvider,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Massive,
    Csv,
    Mock,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    symbol: String,

    /// Number of future calendar days to forecast
    #[arg(short, long, default_value_t = 5)]
    days: usize,

    /// Where daily history comes from
    #[arg(long, value_enum, default_value_t = Source::Massive)]
    source: Source,

    /// Directory holding {SYMBOL}.csv files (csv source)
    #[arg(long, default_value = "data")]
    csv_dir: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn providers(
    cli: &Cli,
    config: &Config,
) -> (Arc<dyn HistoryProvider>, Arc<dyn SentimentProvider>) {
    let p = &config.providers;
    let finnhub: Arc<dyn SentimentProvider> = Arc::new(FinnhubSentimentProvider::new(
        p.finnhub.api_key.clone(),
        p.finnhub.base_url.clone(),
        p.finnhub.lookback_days,
        p.finnhub.max_articles,
        p.http_timeout_secs,
        p.http_max_retries,
    ));

    match cli.source {
        Source::Massive => {
            let history: Arc<dyn HistoryProvider> = Arc::new(MassiveHistoryProvider::new(
                p.massive.api_key.clone(),
                p.massive.base_url.clone(),
                p.http_timeout_secs,
                p.http_max_retries,
            ));
            (history, finnhub)
        }
        Source::Csv => {
            let history: Arc<dyn HistoryProvider> =
                Arc::new(CsvHistoryProvider::new(cli.csv_dir.clone()));
            (history, finnhub)
        }
        Source::Mock => {
            let days = config.model.history_days;
            let today = Utc::now().date_naive();
            let start = today
                .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                .unwrap_or(today);
            let bars = daily_series(start, days as usize, |i| {
                100.0 + 0.25 * i as f64 + (i as f64 * 0.4).sin() * 2.0
            });
            let history: Arc<dyn HistoryProvider> =
                Arc::new(MockHistoryProvider::new().with_bars(&cli.symbol, bars));
            let sentiment: Arc<dyn SentimentProvider> = Arc::new(MockSentimentProvider::neutral());
            (history, sentiment)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs on stderr so stdout carries only the JSON result.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let settings = config.to_forecast_settings()?;
    info!(
        "finassist {} forecasting {} for {} days ({:?} source)",
        env!("CARGO_PKG_VERSION"),
        cli.symbol,
        cli.days,
        cli.source
    );

    let (history, sentiment) = providers(&cli, &config);
    let service = ForecastService::new(history, sentiment, settings)?;

    match service.forecast(&cli.symbol, cli.days).await {
        Ok(result) => print_json(&result, cli.pretty),
        Err(e) => {
            error!("Forecast failed: {}", e);
            print_json(&e.to_failure(), cli.pretty)?;
            std::process::exit(1);
        }
    }
}
