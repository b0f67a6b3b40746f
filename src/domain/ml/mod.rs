pub mod feature_registry;
pub mod shape;

pub use feature_registry::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow};
pub use shape::{ColumnTarget, FlatTarget};
