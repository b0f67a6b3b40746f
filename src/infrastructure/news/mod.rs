pub mod finnhub;
pub mod sentiment_analyzer;

pub use finnhub::FinnhubSentimentProvider;
pub use sentiment_analyzer::SentimentAnalyzer;
