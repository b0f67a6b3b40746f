pub mod core;
pub mod csv_history;
pub mod massive;
pub mod mock;
pub mod news;

pub use csv_history::CsvHistoryProvider;
pub use massive::MassiveHistoryProvider;
pub use mock::{MockHistoryProvider, MockSentimentProvider};
pub use news::FinnhubSentimentProvider;
