use crate::domain::errors::ForecastError;
use crate::domain::ml::{ColumnTarget, FlatTarget};
use ndarray::{Array2, Array3};

/// Model over `(samples, timesteps, features)` windows.
pub trait SequenceRegressor: Send + Sync {
    /// Returns one prediction per sample as a `(samples, 1)` column.
    fn predict_sequence(&self, x: &Array3<f64>) -> Result<ColumnTarget, ForecastError>;

    /// Model name used in logs and shape errors.
    fn name(&self) -> &str;
}

/// Model over `(samples, features)` rows.
pub trait TabularRegressor: Send + Sync {
    /// Returns one prediction per row as a flat `(samples,)` vector.
    fn predict_rows(&self, x: &Array2<f64>) -> Result<FlatTarget, ForecastError>;

    /// Model name used in logs and shape errors.
    fn name(&self) -> &str;
}
