mod common;

use chrono::Days;
use common::{fast_settings, flat_history, wavy_history};
use finassist::application::forecast::{ForecastSettings, HybridForecastEngine, RuntimeConfig};
use finassist::domain::errors::ForecastError;
use finassist::domain::sentiment::SentimentScore;

#[test]
fn test_flat_history_forecasts_flat_price() {
    let engine = HybridForecastEngine::new(ForecastSettings::default()).unwrap();
    let bars = flat_history(90, 100.0);

    let result = engine.forecast("AAPL", &bars, &[], 5).unwrap();

    assert_eq!(result.symbol, "AAPL");
    assert_eq!(result.current_price, 100.0);
    assert_eq!(result.forecast.len(), 5);
    for point in &result.forecast {
        assert!(
            (point.predicted_price - 100.0).abs() < 0.01,
            "expected ~100, got {}",
            point.predicted_price
        );
    }
}

#[test]
fn test_forecast_length_and_dates() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let bars = wavy_history(90);
    let last_date = bars.last().unwrap().date;

    let result = engine.forecast("MSFT", &bars, &[], 7).unwrap();

    assert_eq!(result.forecast.len(), 7);
    assert_eq!(result.forecast[0].date, last_date + Days::new(1));
    for pair in result.forecast.windows(2) {
        assert_eq!(pair[1].date, pair[0].date + Days::new(1));
    }
    for point in &result.forecast {
        assert!(point.predicted_price.is_finite());
        // Two-decimal output.
        let cents = point.predicted_price * 100.0;
        assert!((cents - cents.round()).abs() < 1e-6);
    }
    assert_eq!(result.model_name, "Hybrid LSTM + Gradient Boosting + Sentiment");
}

#[test]
fn test_identical_inputs_give_identical_forecasts() {
    let bars = wavy_history(80);
    let sentiment = vec![SentimentScore::new(bars[70].date, 0.4)];

    let first = HybridForecastEngine::new(fast_settings())
        .unwrap()
        .forecast("NVDA", &bars, &sentiment, 4)
        .unwrap();
    let second = HybridForecastEngine::new(fast_settings())
        .unwrap()
        .forecast("NVDA", &bars, &sentiment, 4)
        .unwrap();

    for (a, b) in first.forecast.iter().zip(&second.forecast) {
        assert!((a.predicted_price - b.predicted_price).abs() < 1e-4);
    }
}

#[test]
fn test_worker_count_does_not_change_result() {
    let bars = wavy_history(70);
    let run = |threads: usize| {
        let settings = ForecastSettings {
            runtime: RuntimeConfig {
                worker_threads: threads,
            },
            ..fast_settings()
        };
        HybridForecastEngine::new(settings)
            .unwrap()
            .forecast("AMD", &bars, &[], 3)
            .unwrap()
    };

    assert_eq!(run(1), run(3));
}

#[test]
fn test_empty_history_is_insufficient_data() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let err = engine.forecast("AAPL", &[], &[], 5).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { .. }));
    assert_eq!(err.to_failure().error, "InsufficientDataError");
}

#[test]
fn test_zero_horizon_returns_empty_forecast() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let result = engine.forecast("AAPL", &wavy_history(60), &[], 0).unwrap();
    assert!(result.forecast.is_empty());
    assert!(result.current_price > 0.0);
}

#[test]
fn test_horizon_above_maximum_is_rejected() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let err = engine
        .forecast("AAPL", &wavy_history(60), &[], 366)
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidRequestError");
}

#[test]
fn test_min_bars_boundary() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let min_bars = engine.min_bars();
    assert_eq!(min_bars, 34);

    let result = engine
        .forecast("AAPL", &wavy_history(min_bars), &[], 2)
        .unwrap();
    assert_eq!(result.forecast.len(), 2);

    let err = engine
        .forecast("AAPL", &wavy_history(min_bars - 1), &[], 2)
        .unwrap_err();
    assert_eq!(err.kind(), "InsufficientDataError");
}

#[test]
fn test_invalid_settings_rejected() {
    let settings = ForecastSettings {
        target_range: (1.0, 1.0),
        ..ForecastSettings::default()
    };
    assert!(HybridForecastEngine::new(settings).is_err());
}

#[test]
fn test_non_finite_close_early_in_history_is_skipped() {
    let engine = HybridForecastEngine::new(fast_settings()).unwrap();
    let mut bars = wavy_history(90);
    bars[5].close = f64::NAN;
    let last_close = bars.last().unwrap().close;

    let result = engine.forecast("AAPL", &bars, &[], 3).unwrap();

    assert_eq!(result.forecast.len(), 3);
    assert!((result.current_price - last_close).abs() < 0.01);
    assert!(result.forecast.iter().all(|p| p.predicted_price.is_finite()));
}
