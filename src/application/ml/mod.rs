pub mod assembler;
pub mod forecaster;
pub mod model_pair;
pub mod predictor;
pub mod scaler;
pub mod sequence_model;
pub mod tree_model;

pub use assembler::ForecastAssembler;
pub use forecaster::RecursiveForecaster;
pub use model_pair::TrainedModelPair;
pub use predictor::{SequenceRegressor, TabularRegressor};
pub use scaler::{MinMaxScaler, ScalerPair, StandardScaler};
