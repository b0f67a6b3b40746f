use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bearish,
    Neutral,
    Bullish,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Bullish => write!(f, "Bullish"),
        }
    }
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.3 {
            Self::Bullish
        } else if score < -0.3 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

/// News sentiment for one calendar date, in [-1, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentScore {
    pub date: NaiveDate,
    pub score: f64,
}

impl SentimentScore {
    pub fn new(date: NaiveDate, score: f64) -> Self {
        Self { date, score }
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.score)
    }
}

/// Collapses scores to one value per calendar date (mean of same-date scores).
///
/// Non-finite scores are ignored and the daily mean is clamped to [-1, 1].
pub fn daily_average(scores: &[SentimentScore]) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for s in scores.iter().filter(|s| s.score.is_finite()) {
        let entry = sums.entry(s.date).or_insert((0.0, 0));
        entry.0 += s.score;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| (date, (sum / count as f64).clamp(-1.0, 1.0)))
        .collect()
}
