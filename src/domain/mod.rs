// Domain-specific error types
pub mod errors;

// Model input layout and target shape contracts
pub mod ml;

// Port interfaces
pub mod ports;

// News sentiment
pub mod sentiment;

// Core market data and forecast types
pub mod types;

// History integrity checks
pub mod validation;
