//! Single-layer LSTM regressor with a linear head.
//!
//! Gates are stacked in one `(4H, F)` input kernel and one `(4H, H)`
//! recurrent kernel, in the order input, forget, cell candidate, output.
//! Training uses full backpropagation through time, mean squared error and
//! Adam. Per-sample gradients are computed on the current rayon pool and
//! summed in sample order, so the result does not depend on the pool size.

use super::predictor::SequenceRegressor;
use crate::domain::errors::ForecastError;
use crate::domain::ml::ColumnTarget;
use ndarray::{Array, Array1, Array2, Array3, ArrayView2, Axis, Dimension, Zip, s};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

const MODEL_NAME: &str = "LSTM";
const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub struct LstmConfig {
    pub units: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            units: 64,
            epochs: 10,
            batch_size: 8,
            learning_rate: 0.001,
            seed: 42,
        }
    }
}

impl LstmConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.units == 0 || self.epochs == 0 || self.batch_size == 0 {
            return Err(ForecastError::invalid(
                "LSTM units, epochs and batch_size must be > 0",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::invalid(format!(
                "LSTM learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Trainable parameters. Gradients and Adam moments share this layout.
#[derive(Debug, Clone)]
struct LstmWeights {
    kernel: Array2<f64>,
    recurrent: Array2<f64>,
    bias: Array1<f64>,
    head: Array1<f64>,
    head_bias: Array1<f64>,
}

impl LstmWeights {
    fn zeros(input_size: usize, units: usize) -> Self {
        Self {
            kernel: Array2::zeros((4 * units, input_size)),
            recurrent: Array2::zeros((4 * units, units)),
            bias: Array1::zeros(4 * units),
            head: Array1::zeros(units),
            head_bias: Array1::zeros(1),
        }
    }

    fn glorot(input_size: usize, units: usize, rng: &mut StdRng) -> Self {
        let mut weights = Self::zeros(input_size, units);
        glorot_fill(&mut weights.kernel, input_size, 4 * units, rng);
        glorot_fill(&mut weights.recurrent, units, 4 * units, rng);
        let head_limit = (6.0 / (units + 1) as f64).sqrt();
        weights
            .head
            .mapv_inplace(|_| rng.random_range(-head_limit..head_limit));
        // Unit forget bias.
        weights.bias.slice_mut(s![units..2 * units]).fill(1.0);
        weights
    }

    fn add_assign(&mut self, other: &Self) {
        self.kernel += &other.kernel;
        self.recurrent += &other.recurrent;
        self.bias += &other.bias;
        self.head += &other.head;
        self.head_bias += &other.head_bias;
    }

    fn scale(&mut self, factor: f64) {
        self.kernel *= factor;
        self.recurrent *= factor;
        self.bias *= factor;
        self.head *= factor;
        self.head_bias *= factor;
    }
}

fn glorot_fill(matrix: &mut Array2<f64>, fan_in: usize, fan_out: usize, rng: &mut StdRng) {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    matrix.mapv_inplace(|_| rng.random_range(-limit..limit));
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    a.view()
        .insert_axis(Axis(1))
        .dot(&b.view().insert_axis(Axis(0)))
}

/// Activations of one timestep, kept for the backward pass.
struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

struct Adam {
    m: LstmWeights,
    v: LstmWeights,
    step: i32,
    learning_rate: f64,
}

impl Adam {
    fn new(input_size: usize, units: usize, learning_rate: f64) -> Self {
        Self {
            m: LstmWeights::zeros(input_size, units),
            v: LstmWeights::zeros(input_size, units),
            step: 0,
            learning_rate,
        }
    }

    fn update(&mut self, weights: &mut LstmWeights, grads: &LstmWeights) {
        self.step += 1;
        let lr_t = self.learning_rate * (1.0 - ADAM_BETA2.powi(self.step)).sqrt()
            / (1.0 - ADAM_BETA1.powi(self.step));

        adam_update(
            &mut weights.kernel,
            &grads.kernel,
            &mut self.m.kernel,
            &mut self.v.kernel,
            lr_t,
        );
        adam_update(
            &mut weights.recurrent,
            &grads.recurrent,
            &mut self.m.recurrent,
            &mut self.v.recurrent,
            lr_t,
        );
        adam_update(&mut weights.bias, &grads.bias, &mut self.m.bias, &mut self.v.bias, lr_t);
        adam_update(&mut weights.head, &grads.head, &mut self.m.head, &mut self.v.head, lr_t);
        adam_update(
            &mut weights.head_bias,
            &grads.head_bias,
            &mut self.m.head_bias,
            &mut self.v.head_bias,
            lr_t,
        );
    }
}

fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    lr_t: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
            *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
            *p -= lr_t * *m / (v.sqrt() + ADAM_EPSILON);
        });
}

#[derive(Debug, Clone)]
pub struct LstmRegressor {
    weights: LstmWeights,
    input_size: usize,
    units: usize,
    loss_history: Vec<f64>,
}

impl LstmRegressor {
    /// Trains on `x: (samples, timesteps, features)` against a column target.
    pub fn fit(
        x: &Array3<f64>,
        y: &ColumnTarget,
        config: &LstmConfig,
    ) -> Result<Self, ForecastError> {
        config.validate()?;
        let (samples, timesteps, input_size) = x.dim();
        if samples == 0 || timesteps == 0 || input_size == 0 {
            return Err(ForecastError::shape(
                "LSTM fit input",
                "(N>0, T>0, F>0)",
                format!("{:?}", x.shape()),
            ));
        }
        if y.len() != samples {
            return Err(ForecastError::shape(
                "LSTM fit target",
                format!("({}, 1)", samples),
                format!("{:?}", y.view().shape()),
            ));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut model = Self {
            weights: LstmWeights::glorot(input_size, config.units, &mut rng),
            input_size,
            units: config.units,
            loss_history: Vec::with_capacity(config.epochs),
        };
        let mut optimizer = Adam::new(input_size, config.units, config.learning_rate);
        let targets = y.to_flat().to_vec();
        let mut order: Vec<usize> = (0..samples).collect();

        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);
            let mut squared_error = 0.0;

            for batch in order.chunks(config.batch_size) {
                let per_sample: Vec<(LstmWeights, f64)> = batch
                    .par_iter()
                    .map(|&idx| model.sample_gradient(x.slice(s![idx, .., ..]), targets[idx]))
                    .collect();

                let mut grads = LstmWeights::zeros(input_size, config.units);
                for (g, err) in &per_sample {
                    grads.add_assign(g);
                    squared_error += err * err;
                }
                grads.scale(2.0 / batch.len() as f64);
                optimizer.update(&mut model.weights, &grads);
            }

            let loss = squared_error / samples as f64;
            if !loss.is_finite() {
                return Err(ForecastError::training(
                    MODEL_NAME,
                    format!("loss diverged at epoch {}", epoch + 1),
                ));
            }
            debug!("LSTM epoch {}/{}: loss={:.6}", epoch + 1, config.epochs, loss);
            model.loss_history.push(loss);
        }

        info!(
            "LSTM trained: {} samples, {} units, final loss {:.6}",
            samples,
            config.units,
            model.loss_history.last().copied().unwrap_or(f64::NAN)
        );
        Ok(model)
    }

    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    fn run_sequence(&self, sequence: ArrayView2<f64>) -> (Vec<StepCache>, Array1<f64>) {
        let units = self.units;
        let mut h: Array1<f64> = Array1::zeros(units);
        let mut c: Array1<f64> = Array1::zeros(units);
        let mut caches = Vec::with_capacity(sequence.nrows());

        for x_t in sequence.axis_iter(Axis(0)) {
            let z = self.weights.kernel.dot(&x_t)
                + self.weights.recurrent.dot(&h)
                + &self.weights.bias;
            let i = z.slice(s![0..units]).mapv(sigmoid);
            let f = z.slice(s![units..2 * units]).mapv(sigmoid);
            let g = z.slice(s![2 * units..3 * units]).mapv(f64::tanh);
            let o = z.slice(s![3 * units..4 * units]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            caches.push(StepCache {
                x: x_t.to_owned(),
                h_prev: std::mem::replace(&mut h, h_next),
                c_prev: std::mem::replace(&mut c, c_next),
                i,
                f,
                g,
                o,
                tanh_c,
            });
        }
        (caches, h)
    }

    fn predict_one(&self, sequence: ArrayView2<f64>) -> f64 {
        let (_, h) = self.run_sequence(sequence);
        self.weights.head.dot(&h) + self.weights.head_bias[0]
    }

    /// Gradient of `(y_hat - y)^2 / 2` for one sample, plus the raw error.
    fn sample_gradient(&self, sequence: ArrayView2<f64>, target: f64) -> (LstmWeights, f64) {
        let units = self.units;
        let (caches, h_last) = self.run_sequence(sequence);
        let err = self.weights.head.dot(&h_last) + self.weights.head_bias[0] - target;

        let mut grads = LstmWeights::zeros(self.input_size, units);
        grads.head = &h_last * err;
        grads.head_bias[0] = err;

        let mut dh = &self.weights.head * err;
        let mut dc: Array1<f64> = Array1::zeros(units);

        for step in caches.iter().rev() {
            let d_o = &dh * &step.tanh_c;
            dc = dc + &dh * &step.o * &step.tanh_c.mapv(|t| 1.0 - t * t);

            let d_i = &dc * &step.g;
            let d_g = &dc * &step.i;
            let d_f = &dc * &step.c_prev;

            let mut dz = Array1::zeros(4 * units);
            dz.slice_mut(s![0..units])
                .assign(&(d_i * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![units..2 * units])
                .assign(&(d_f * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * units..3 * units])
                .assign(&(d_g * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * units..4 * units])
                .assign(&(d_o * &step.o.mapv(|v| v * (1.0 - v))));

            grads.kernel += &outer(&dz, &step.x);
            grads.recurrent += &outer(&dz, &step.h_prev);
            grads.bias += &dz;

            dh = self.weights.recurrent.t().dot(&dz);
            dc = &dc * &step.f;
        }

        (grads, err)
    }
}

impl SequenceRegressor for LstmRegressor {
    fn predict_sequence(&self, x: &Array3<f64>) -> Result<ColumnTarget, ForecastError> {
        let (_, timesteps, features) = x.dim();
        if timesteps == 0 || features != self.input_size {
            return Err(ForecastError::shape(
                "LSTM predict input",
                format!("(N, T>0, {})", self.input_size),
                format!("{:?}", x.shape()),
            ));
        }

        let predictions: Vec<f64> = x
            .axis_iter(Axis(0))
            .map(|sequence| self.predict_one(sequence))
            .collect();
        Ok(ColumnTarget::from_values(&predictions))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}
