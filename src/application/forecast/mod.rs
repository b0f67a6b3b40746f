pub mod engine;
pub mod service;

pub use engine::{ForecastSettings, HybridForecastEngine, RuntimeConfig};
pub use service::ForecastService;
