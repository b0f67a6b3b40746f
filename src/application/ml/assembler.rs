use super::scaler::FittedMinMaxScaler;
use crate::domain::errors::ForecastError;
use crate::domain::ml::ColumnTarget;
use crate::domain::types::{ForecastPoint, ForecastResult, round_price};
use chrono::{Days, NaiveDate};

pub const MODEL_NAME: &str = "Hybrid LSTM + Gradient Boosting + Sentiment";

/// Turns scaled rollout output into dated price points.
pub struct ForecastAssembler<'a> {
    target_scaler: &'a FittedMinMaxScaler,
}

impl<'a> ForecastAssembler<'a> {
    pub fn new(target_scaler: &'a FittedMinMaxScaler) -> Self {
        Self { target_scaler }
    }

    /// Inverse-transforms the whole sequence at once and dates step `i`
    /// (1-based) as `last_date + i` calendar days.
    pub fn points(
        &self,
        scaled: &[f64],
        last_date: NaiveDate,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        if scaled.is_empty() {
            return Ok(Vec::new());
        }

        let prices = self
            .target_scaler
            .inverse_transform(&ColumnTarget::from_values(scaled))
            .to_flat()
            .to_vec();

        prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| {
                let date = last_date
                    .checked_add_days(Days::new(i as u64 + 1))
                    .ok_or_else(|| {
                        ForecastError::invalid(format!(
                            "forecast date overflows after {} + {} days",
                            last_date,
                            i + 1
                        ))
                    })?;
                Ok(ForecastPoint {
                    date,
                    predicted_price: round_price(price),
                })
            })
            .collect()
    }

    pub fn assemble(
        &self,
        symbol: &str,
        current_price: f64,
        scaled: &[f64],
        last_date: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        Ok(ForecastResult {
            symbol: symbol.to_string(),
            current_price: round_price(current_price),
            forecast: self.points(scaled, last_date)?,
            model_name: MODEL_NAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::scaler::MinMaxScaler;

    #[test]
    fn test_points_are_dated_and_rounded() {
        let y = ColumnTarget::from_values(&[100.0, 200.0]);
        let scaler = MinMaxScaler::default().fit(&y).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();

        let points = ForecastAssembler::new(&scaler)
            .points(&[0.5, 0.123456], last)
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(points[0].predicted_price, 150.0);
        assert_eq!(points[1].predicted_price, 112.35);
    }

    #[test]
    fn test_empty_sequence() {
        let scaler = MinMaxScaler::default()
            .fit(&ColumnTarget::from_values(&[1.0]))
            .unwrap();
        let result = ForecastAssembler::new(&scaler)
            .assemble("AAPL", 1.234, &[], NaiveDate::MAX)
            .unwrap();
        assert!(result.forecast.is_empty());
        assert_eq!(result.current_price, 1.23);
    }

    #[test]
    fn test_date_overflow_is_error() {
        let scaler = MinMaxScaler::default()
            .fit(&ColumnTarget::from_values(&[1.0]))
            .unwrap();
        assert!(
            ForecastAssembler::new(&scaler)
                .points(&[0.0], NaiveDate::MAX)
                .is_err()
        );
    }
}
