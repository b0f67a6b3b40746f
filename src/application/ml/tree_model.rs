//! Gradient-boosted regression trees with squared loss.
//!
//! Each stage fits a smartcore CART regressor on the current residuals and
//! adds its shrunken prediction to the ensemble, starting from the target mean.

use super::predictor::TabularRegressor;
use crate::domain::errors::ForecastError;
use crate::domain::ml::FlatTarget;
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::info;

const MODEL_NAME: &str = "GradientBoostedTrees";

type Tree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostingConfig {
    /// Number of boosting iterations (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    pub max_depth: u16,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    /// Fraction of rows drawn (without replacement) for each tree
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 80,
            learning_rate: 0.3,
            max_depth: 6,
            min_samples_leaf: 1,
            min_samples_split: 2,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl GradientBoostingConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.n_estimators == 0 || self.max_depth == 0 {
            return Err(ForecastError::invalid(
                "GBM n_estimators and max_depth must be > 0",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::invalid(format!(
                "GBM learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForecastError::invalid(format!(
                "GBM subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        Ok(())
    }

    fn tree_params(&self) -> DecisionTreeRegressorParameters {
        DecisionTreeRegressorParameters::default()
            .with_max_depth(self.max_depth)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_min_samples_split(self.min_samples_split)
    }
}

fn to_dense(x: &Array2<f64>) -> Result<DenseMatrix<f64>, ForecastError> {
    let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| ForecastError::training(MODEL_NAME, format!("Matrix creation failed: {}", e)))
}

pub struct GradientBoostedTrees {
    base_score: f64,
    learning_rate: f64,
    n_features: usize,
    trees: Vec<Tree>,
}

impl GradientBoostedTrees {
    pub fn fit(
        x: &Array2<f64>,
        y: &FlatTarget,
        config: &GradientBoostingConfig,
    ) -> Result<Self, ForecastError> {
        config.validate()?;
        let (samples, n_features) = x.dim();
        if samples == 0 || n_features == 0 {
            return Err(ForecastError::shape(
                "GBM fit input",
                "(N>0, F>0)",
                format!("{:?}", x.shape()),
            ));
        }
        if y.len() != samples {
            return Err(ForecastError::shape(
                "GBM fit target",
                format!("({},)", samples),
                format!("({},)", y.len()),
            ));
        }

        let targets = y.as_array();
        let base_score = targets.mean().unwrap_or(0.0);
        let mut current = Array1::from_elem(samples, base_score);
        let full = to_dense(x)?;

        let sample_size = ((samples as f64 * config.subsample).ceil() as usize).clamp(1, samples);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut rows: Vec<usize> = (0..samples).collect();

        let mut trees = Vec::with_capacity(config.n_estimators);
        for stage in 0..config.n_estimators {
            let residuals = targets - &current;

            let fitted = if sample_size < samples {
                rows.shuffle(&mut rng);
                let mut picked = rows[..sample_size].to_vec();
                picked.sort_unstable();
                let x_sub = to_dense(&x.select(Axis(0), &picked))?;
                let r_sub: Vec<f64> = picked.iter().map(|&i| residuals[i]).collect();
                Tree::fit(&x_sub, &r_sub, config.tree_params())
            } else {
                Tree::fit(&full, &residuals.to_vec(), config.tree_params())
            };
            let tree = fitted.map_err(|e| {
                ForecastError::training(MODEL_NAME, format!("tree {} failed: {}", stage, e))
            })?;

            let update = tree.predict(&full).map_err(|e| {
                ForecastError::training(MODEL_NAME, format!("tree {} predict failed: {}", stage, e))
            })?;
            current.zip_mut_with(&Array1::from(update), |c, u| {
                *c += config.learning_rate * u
            });
            trees.push(tree);
        }

        let rmse = ((targets - &current).mapv(|r| r * r).sum() / samples as f64).sqrt();
        if !rmse.is_finite() {
            return Err(ForecastError::training(MODEL_NAME, "non-finite training error"));
        }
        info!(
            "GBM trained: {} trees on {} samples, train RMSE {:.6}",
            trees.len(),
            samples,
            rmse
        );

        Ok(Self {
            base_score,
            learning_rate: config.learning_rate,
            n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TabularRegressor for GradientBoostedTrees {
    fn predict_rows(&self, x: &Array2<f64>) -> Result<FlatTarget, ForecastError> {
        if x.ncols() != self.n_features {
            return Err(ForecastError::shape(
                "GBM predict input",
                format!("(N, {})", self.n_features),
                format!("{:?}", x.shape()),
            ));
        }

        let dense = to_dense(x)?;
        let mut out = Array1::from_elem(x.nrows(), self.base_score);
        for tree in &self.trees {
            let update: Vec<f64> = tree
                .predict(&dense)
                .map_err(|e| ForecastError::training(MODEL_NAME, format!("predict failed: {}", e)))?;
            out.zip_mut_with(&Array1::from(update), |o, u| *o += self.learning_rate * u);
        }
        Ok(FlatTarget::new(out))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Array2<f64>, FlatTarget) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| (i * (j + 1)) as f64);
        let y = Array1::from_iter((0..40).map(|i| if i < 20 { 1.0 } else { 3.0 }));
        (x, FlatTarget::new(y))
    }

    #[test]
    fn test_fits_step_function() {
        let (x, y) = step_data();
        let model = GradientBoostedTrees::fit(&x, &y, &GradientBoostingConfig::default()).unwrap();
        assert_eq!(model.n_trees(), 80);

        let pred = model.predict_rows(&x).unwrap();
        assert_eq!(pred.len(), 40);
        for (p, t) in pred.to_vec().iter().zip(y.to_vec()) {
            assert!((p - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x = Array2::from_shape_fn((10, 3), |(i, j)| (i + j) as f64);
        let y = FlatTarget::new(Array1::from_elem(10, 0.5));
        let model = GradientBoostedTrees::fit(&x, &y, &GradientBoostingConfig::default()).unwrap();

        let pred = model.predict_rows(&Array2::zeros((1, 3))).unwrap();
        assert!((pred.single_value("gbm").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_subsample_is_seeded() {
        let (x, y) = step_data();
        let config = GradientBoostingConfig {
            subsample: 0.5,
            ..GradientBoostingConfig::default()
        };
        let a = GradientBoostedTrees::fit(&x, &y, &config).unwrap();
        let b = GradientBoostedTrees::fit(&x, &y, &config).unwrap();
        assert_eq!(a.predict_rows(&x).unwrap(), b.predict_rows(&x).unwrap());
    }

    #[test]
    fn test_shape_contracts() {
        let (x, _) = step_data();
        let short = FlatTarget::new(Array1::zeros(39));
        let err = GradientBoostedTrees::fit(&x, &short, &GradientBoostingConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), "ShapeMismatchError");

        let (x, y) = step_data();
        let model = GradientBoostedTrees::fit(&x, &y, &GradientBoostingConfig::default()).unwrap();
        assert!(model.predict_rows(&Array2::zeros((1, 5))).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config = GradientBoostingConfig {
            subsample: 0.0,
            ..GradientBoostingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
