// Per-request forecast engine and async service
pub mod forecast;

// Feature engineering over daily bars
pub mod market_data;

// Scalers, learners and the recursive rollout
pub mod ml;
