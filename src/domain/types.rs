use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar as returned by a history provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar whose open, high, low and close all equal `price`.
    pub fn flat(date: NaiveDate, price: f64, volume: f64) -> Self {
        Self::new(date, price, price, price, price, volume)
    }
}

/// Forecast for a single future calendar date, in price units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    #[serde(rename = "price")]
    pub predicted_price: f64,
}

/// Response of one forecast request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub symbol: String,
    pub current_price: f64,
    pub forecast: Vec<ForecastPoint>,
    pub model_name: String,
}

/// Rounds a price to the two-decimal display precision.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
