//! Local NLP-based sentiment scoring for company news using VADER
//!
//! VADER's compound score is combined with an equity-news keyword boost,
//! since earnings and analyst jargon is mostly missing from its lexicon.
//!
//! # Example
//! ```rust,ignore
//! use finassist::infrastructure::news::sentiment_analyzer::SentimentAnalyzer;
//!
//! let analyzer = SentimentAnalyzer::new();
//! let score = analyzer.analyze("Apple beats estimates, shares surge to record high");
//! assert!(score > 0.3); // Bullish
//! ```

use vader_sentiment::SentimentIntensityAnalyzer;

const HEADLINE_WEIGHT: f64 = 0.7;
const SUMMARY_WEIGHT: f64 = 0.3;
const BOOST_WEIGHT: f64 = 0.5;

const BULLISH_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 0.4),
    ("soar", 0.5),
    ("rally", 0.4),
    ("jumps", 0.3),
    ("beats estimates", 0.5),
    ("beat estimates", 0.5),
    ("tops estimates", 0.4),
    ("record revenue", 0.4),
    ("record high", 0.4),
    ("all-time high", 0.5),
    ("raises guidance", 0.5),
    ("raised guidance", 0.5),
    ("upgrade", 0.3),
    ("outperform", 0.3),
    ("buyback", 0.3),
    ("dividend hike", 0.4),
    ("bullish", 0.5),
    ("partnership", 0.2),
    ("breakthrough", 0.4),
];

const BEARISH_KEYWORDS: &[(&str, f64)] = &[
    ("plunge", -0.5),
    ("tumble", -0.4),
    ("slump", -0.4),
    ("crash", -0.5),
    ("misses estimates", -0.5),
    ("missed estimates", -0.5),
    ("cuts guidance", -0.5),
    ("lowers guidance", -0.5),
    ("profit warning", -0.5),
    ("downgrade", -0.3),
    ("underperform", -0.3),
    ("layoffs", -0.3),
    ("recall", -0.3),
    ("lawsuit", -0.4),
    ("investigation", -0.3),
    ("antitrust", -0.3),
    ("fraud", -0.5),
    ("bankruptcy", -0.6),
    ("sell-off", -0.4),
    ("selloff", -0.4),
    ("bearish", -0.5),
];

/// A thread-safe sentiment analyzer using VADER with financial keyword boosting.
pub struct SentimentAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    fn financial_boost(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        BULLISH_KEYWORDS
            .iter()
            .chain(BEARISH_KEYWORDS)
            .filter(|(keyword, _)| text_lower.contains(keyword))
            .map(|(_, score)| score)
            .sum()
    }

    /// Sentiment of `text` in [-1.0, 1.0]; empty text is neutral.
    pub fn analyze(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        let vader_score = scores["compound"];
        (vader_score + self.financial_boost(text) * BOOST_WEIGHT).clamp(-1.0, 1.0)
    }

    /// Headline weighted 70%, summary 30%. A missing summary leaves the
    /// headline score alone instead of pulling it toward neutral.
    pub fn analyze_news(&self, headline: &str, summary: &str) -> f64 {
        let headline_score = self.analyze(headline);
        if summary.trim().is_empty() {
            return headline_score;
        }
        headline_score * HEADLINE_WEIGHT + self.analyze(summary) * SUMMARY_WEIGHT
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
