#![allow(dead_code)]

use chrono::NaiveDate;
use finassist::application::forecast::ForecastSettings;
use finassist::application::ml::sequence_model::LstmConfig;
use finassist::domain::types::PriceBar;
use finassist::infrastructure::mock::daily_series;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn flat_history(count: usize, price: f64) -> Vec<PriceBar> {
    daily_series(start_date(), count, |_| price)
}

/// Upward drift with a weekly-ish wobble, so every indicator moves.
pub fn wavy_history(count: usize) -> Vec<PriceBar> {
    daily_series(start_date(), count, |i| {
        150.0 + 0.3 * i as f64 + (i as f64 * 0.9).sin() * 3.0
    })
}

/// Default pipeline with a smaller sequence model to keep tests fast.
pub fn fast_settings() -> ForecastSettings {
    ForecastSettings {
        sequence: LstmConfig {
            units: 16,
            epochs: 5,
            ..LstmConfig::default()
        },
        ..ForecastSettings::default()
    }
}
