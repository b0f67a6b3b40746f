//! Recursive multi-step rollout over the two trained models.

use super::predictor::{SequenceRegressor, TabularRegressor};
use crate::domain::errors::ForecastError;
use crate::domain::ml::shape::to_sequence_tensor;
use ndarray::{Array1, ArrayView1, Axis, s};
use tracing::debug;

/// Drops the first element, moves every other element one slot left and
/// writes `value` into the last slot.
pub fn shift_in(features: ArrayView1<f64>, value: f64) -> Array1<f64> {
    let mut shifted = Array1::zeros(features.len());
    if features.is_empty() {
        return shifted;
    }
    let n = features.len();
    shifted
        .slice_mut(s![..n - 1])
        .assign(&features.slice(s![1..]));
    shifted[n - 1] = value;
    shifted
}

pub struct RecursiveForecaster<'a> {
    sequence: &'a dyn SequenceRegressor,
    tabular: &'a dyn TabularRegressor,
}

impl<'a> RecursiveForecaster<'a> {
    pub fn new(sequence: &'a dyn SequenceRegressor, tabular: &'a dyn TabularRegressor) -> Self {
        Self { sequence, tabular }
    }

    /// Runs exactly `future_days` steps from `last_features` and returns the
    /// scaled per-step forecasts. Any failing step aborts the whole rollout.
    pub fn rollout(
        &self,
        last_features: ArrayView1<f64>,
        future_days: usize,
    ) -> Result<Vec<f64>, ForecastError> {
        let mut state = last_features.to_owned();
        let mut predictions = Vec::with_capacity(future_days);

        for step in 0..future_days {
            let window = to_sequence_tensor(&state.view().insert_axis(Axis(0)).to_owned());
            let sequence_value = self
                .sequence
                .predict_sequence(&window)?
                .single_value(self.sequence.name())?;

            let shifted = shift_in(state.view(), sequence_value);
            let row = shifted.view().insert_axis(Axis(0)).to_owned();
            let tabular_value = self
                .tabular
                .predict_rows(&row)?
                .single_value(self.tabular.name())?;

            debug!(
                "Rollout step {}: sequence={:.6} tabular={:.6}",
                step + 1,
                sequence_value,
                tabular_value
            );
            predictions.push(tabular_value);
            state = shifted;
        }

        Ok(predictions)
    }
}
