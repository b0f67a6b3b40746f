use super::forecaster::RecursiveForecaster;
use super::sequence_model::{LstmConfig, LstmRegressor};
use super::tree_model::{GradientBoostedTrees, GradientBoostingConfig};
use crate::domain::errors::ForecastError;
use crate::domain::ml::ColumnTarget;
use crate::domain::ml::shape::{ensure_matching_rows, to_sequence_tensor};
use ndarray::Array2;

/// Both learners, trained on the same scaled window for one request.
pub struct TrainedModelPair {
    pub sequence: LstmRegressor,
    pub tree: GradientBoostedTrees,
}

impl TrainedModelPair {
    pub fn train(
        x_scaled: &Array2<f64>,
        y_scaled: &ColumnTarget,
        sequence_config: &LstmConfig,
        tree_config: &GradientBoostingConfig,
    ) -> Result<Self, ForecastError> {
        ensure_matching_rows("model pair training", x_scaled.nrows(), y_scaled.len())?;

        let sequence = LstmRegressor::fit(&to_sequence_tensor(x_scaled), y_scaled, sequence_config)?;
        let tree = GradientBoostedTrees::fit(x_scaled, &y_scaled.to_flat(), tree_config)?;

        Ok(Self { sequence, tree })
    }

    pub fn forecaster(&self) -> RecursiveForecaster<'_> {
        RecursiveForecaster::new(&self.sequence, &self.tree)
    }
}
