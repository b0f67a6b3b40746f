use crate::domain::types::PriceBar;
use tracing::warn;

/// Centralized validator for daily history integrity.
///
/// Rejects bars that are physically impossible (non-positive prices,
/// inverted ranges, negative volume, NaN).
pub struct PriceBarValidator;

impl PriceBarValidator {
    /// Validates a single bar. Returns true if valid, false otherwise.
    pub fn validate_bar(symbol: &str, bar: &PriceBar) -> bool {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite()) || !bar.volume.is_finite() {
            warn!(
                "Validation FAILED: Bar for {} on {} has non-finite values",
                symbol, bar.date
            );
            return false;
        }

        if prices.iter().any(|p| *p <= 0.0) {
            warn!(
                "Validation FAILED: Bar for {} on {} has non-positive price component(s)",
                symbol, bar.date
            );
            return false;
        }

        if bar.low > bar.high {
            warn!(
                "Validation FAILED: Bar for {} on {} has low {} > high {}",
                symbol, bar.date, bar.low, bar.high
            );
            return false;
        }

        if bar.volume < 0.0 {
            warn!(
                "Validation FAILED: Bar for {} on {} has negative volume: {}",
                symbol, bar.date, bar.volume
            );
            return false;
        }

        true
    }

    /// Drops invalid bars, sorts by date and keeps the last bar for a repeated date.
    pub fn sanitize(symbol: &str, bars: Vec<PriceBar>) -> Vec<PriceBar> {
        let mut clean: Vec<PriceBar> = bars
            .into_iter()
            .filter(|bar| Self::validate_bar(symbol, bar))
            .collect();

        // Stable sort keeps provider order among equal dates, so "last" is well defined.
        clean.sort_by_key(|bar| bar.date);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(clean.len());
        for bar in clean {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        deduped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    #[test]
    fn test_valid_bar() {
        let bar = PriceBar::new(day(1), 100.0, 105.0, 99.0, 102.0, 1_000.0);
        assert!(PriceBarValidator::validate_bar("AAPL", &bar));
    }

    #[test]
    fn test_invalid_bars() {
        let zero_close = PriceBar::new(day(1), 100.0, 105.0, 99.0, 0.0, 1_000.0);
        let inverted = PriceBar::new(day(1), 100.0, 95.0, 99.0, 97.0, 1_000.0);
        let negative_volume = PriceBar::new(day(1), 100.0, 105.0, 99.0, 102.0, -1.0);
        let nan_close = PriceBar::new(day(1), 100.0, 105.0, 99.0, f64::NAN, 1.0);

        for bar in [zero_close, inverted, negative_volume, nan_close] {
            assert!(!PriceBarValidator::validate_bar("AAPL", &bar));
        }
    }

    #[test]
    fn test_sanitize_sorts_and_dedups() {
        let bars = vec![
            PriceBar::flat(day(3), 103.0, 10.0),
            PriceBar::flat(day(1), 101.0, 10.0),
            PriceBar::flat(day(3), 104.0, 10.0),
            PriceBar::flat(day(2), -5.0, 10.0),
        ];

        let clean = PriceBarValidator::sanitize("AAPL", bars);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].date, day(1));
        assert_eq!(clean[1].date, day(3));
        assert_eq!(clean[1].close, 104.0);
    }
}
