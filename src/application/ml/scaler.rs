//! Input and target normalizers.
//!
//! `fit` consumes an unfitted scaler and returns a distinct fitted type that
//! has no `fit` method, so a request can never refit mid-rollout.

use crate::domain::errors::ForecastError;
use crate::domain::ml::ColumnTarget;
use ndarray::{Array1, Array2, Axis};
use statrs::statistics::Statistics;

/// A column is constant if its variance is within floating-point noise of zero.
fn is_constant(variance: f64, mean: f64, n: usize) -> bool {
    let n = n as f64;
    let eps = f64::EPSILON;
    variance <= n * eps * variance + (n * mean.abs() * eps).powi(2)
}

/// Per-column standardization `(x - mean) / std` with population std.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

#[derive(Debug, Clone, PartialEq)]
pub struct FittedStandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(self, x: &Array2<f64>) -> Result<FittedStandardScaler, ForecastError> {
        if x.nrows() == 0 {
            return Err(ForecastError::shape("feature scaler fit", "(N>0, F)", "(0, F)"));
        }

        let mut means = Array1::zeros(x.ncols());
        let mut scales = Array1::ones(x.ncols());
        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let values: Vec<f64> = column.to_vec();
            let mean = values.iter().mean();
            let variance = values.iter().population_variance();
            means[j] = mean;
            if !is_constant(variance, mean, values.len()) {
                scales[j] = variance.sqrt();
            }
        }

        Ok(FittedStandardScaler { means, scales })
    }

    pub fn fit_transform(
        self,
        x: &Array2<f64>,
    ) -> Result<(FittedStandardScaler, Array2<f64>), ForecastError> {
        let fitted = self.fit(x)?;
        let scaled = fitted.transform(x)?;
        Ok((fitted, scaled))
    }
}

impl FittedStandardScaler {
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ForecastError> {
        if x.ncols() != self.n_features() {
            return Err(ForecastError::shape(
                "feature scaler transform",
                format!("(N, {})", self.n_features()),
                format!("{:?}", x.shape()),
            ));
        }
        Ok((x - &self.means) / &self.scales)
    }
}

/// Min-max scaling of a column target into `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    range: (f64, f64),
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self { range: (0.0, 1.0) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedMinMaxScaler {
    range: (f64, f64),
    data_min: f64,
    data_range: f64,
}

impl MinMaxScaler {
    pub fn new(range: (f64, f64)) -> Result<Self, ForecastError> {
        if !(range.0.is_finite() && range.1.is_finite() && range.0 < range.1) {
            return Err(ForecastError::invalid(format!(
                "target range must be finite and increasing, got {:?}",
                range
            )));
        }
        Ok(Self { range })
    }

    pub fn fit(self, y: &ColumnTarget) -> Result<FittedMinMaxScaler, ForecastError> {
        if y.is_empty() {
            return Err(ForecastError::shape("target scaler fit", "(N>0, 1)", "(0, 1)"));
        }

        let column = y.view();
        let column = column.column(0);
        let data_min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = data_max - data_min;

        Ok(FittedMinMaxScaler {
            range: self.range,
            data_min,
            data_range: if span > 0.0 { span } else { 1.0 },
        })
    }

    pub fn fit_transform(
        self,
        y: &ColumnTarget,
    ) -> Result<(FittedMinMaxScaler, ColumnTarget), ForecastError> {
        let fitted = self.fit(y)?;
        let scaled = fitted.transform(y);
        Ok((fitted, scaled))
    }
}

impl FittedMinMaxScaler {
    fn scale(&self) -> f64 {
        (self.range.1 - self.range.0) / self.data_range
    }

    pub fn transform(&self, y: &ColumnTarget) -> ColumnTarget {
        let scale = self.scale();
        let values = y.view().mapv(|v| (v - self.data_min) * scale + self.range.0);
        ColumnTarget::from_values(&values.column(0).to_vec())
    }

    pub fn inverse_transform(&self, y_scaled: &ColumnTarget) -> ColumnTarget {
        let scale = self.scale();
        let values = y_scaled
            .view()
            .mapv(|v| (v - self.range.0) / scale + self.data_min);
        ColumnTarget::from_values(&values.column(0).to_vec())
    }
}

/// Feature and target scalers fitted on the same training window.
#[derive(Debug, Clone)]
pub struct ScalerPair {
    pub features: FittedStandardScaler,
    pub target: FittedMinMaxScaler,
}

impl ScalerPair {
    /// Fits both scalers and returns them with the scaled training data.
    pub fn fit(
        x: &Array2<f64>,
        y: &ColumnTarget,
        target_range: (f64, f64),
    ) -> Result<(Self, Array2<f64>, ColumnTarget), ForecastError> {
        if x.nrows() != y.len() {
            return Err(ForecastError::shape(
                "scaler pair fit",
                format!("{} target rows", x.nrows()),
                format!("{} target rows", y.len()),
            ));
        }
        let (features, x_scaled) = StandardScaler.fit_transform(x)?;
        let (target, y_scaled) = MinMaxScaler::new(target_range)?.fit_transform(y)?;
        Ok((Self { features, target }, x_scaled, y_scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler_population_std() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let (fitted, scaled) = StandardScaler.fit_transform(&x).unwrap();

        assert_eq!(scaled, array![[-1.0, 0.0], [1.0, 0.0]]);
        assert_eq!(fitted.n_features(), 2);
    }

    #[test]
    fn test_standard_scaler_rejects_wrong_width() {
        let fitted = StandardScaler.fit(&Array2::ones((3, 8))).unwrap();
        let err = fitted.transform(&Array2::ones((1, 7))).unwrap_err();
        assert_eq!(err.kind(), "ShapeMismatchError");
    }

    #[test]
    fn test_target_round_trip() {
        let y = ColumnTarget::from_values(&[101.5, 99.25, 120.0, 87.125, 110.0]);
        let (fitted, scaled) = MinMaxScaler::default().fit_transform(&y).unwrap();

        let scaled_values = scaled.to_flat().to_vec();
        assert!(scaled_values.iter().all(|v| (0.0..=1.0).contains(v)));

        let restored = fitted.inverse_transform(&scaled);
        for (a, b) in restored.to_flat().to_vec().iter().zip(y.to_flat().to_vec()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_constant_target_maps_to_range_min() {
        let y = ColumnTarget::from_values(&[100.0; 4]);
        let (fitted, scaled) = MinMaxScaler::default().fit_transform(&y).unwrap();

        assert_eq!(scaled.to_flat().to_vec(), vec![0.0; 4]);
        let restored = fitted.inverse_transform(&ColumnTarget::from_values(&[0.0]));
        assert_eq!(restored.single_value("restore").unwrap(), 100.0);
    }

    #[test]
    fn test_invalid_target_range() {
        assert!(MinMaxScaler::new((1.0, 0.0)).is_err());
        assert!(MinMaxScaler::new((0.0, f64::NAN)).is_err());
    }

    #[test]
    fn test_pair_rejects_row_mismatch() {
        let x = Array2::ones((3, 2));
        let y = ColumnTarget::from_values(&[1.0, 2.0]);
        assert!(ScalerPair::fit(&x, &y, (0.0, 1.0)).is_err());
    }
}
