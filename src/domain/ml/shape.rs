//! Typed target-shape contracts shared by the scalers and both models.
//!
//! The sequence model and the target scaler work on column targets `(N, 1)`;
//! the tree ensemble works on flat targets `(N,)`. Converting between the two
//! is always an explicit call, and a wrong width is rejected instead of being
//! reshaped.

use crate::domain::errors::ForecastError;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};

/// Column-shaped target, always `(N, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTarget(Array2<f64>);

impl ColumnTarget {
    pub fn new(values: Array2<f64>) -> Result<Self, ForecastError> {
        if values.ncols() != 1 {
            return Err(ForecastError::shape(
                "column target",
                "(N, 1)",
                format!("{:?}", values.shape()),
            ));
        }
        Ok(Self(values))
    }

    pub fn from_values(values: &[f64]) -> Self {
        Self(Array1::from(values.to_vec()).insert_axis(Axis(1)))
    }

    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    pub fn to_flat(&self) -> FlatTarget {
        FlatTarget(self.0.column(0).to_owned())
    }

    /// The only value of a `(1, 1)` target.
    pub fn single_value(&self, context: &str) -> Result<f64, ForecastError> {
        if self.len() != 1 {
            return Err(ForecastError::shape(
                context,
                "(1, 1)",
                format!("{:?}", self.0.shape()),
            ));
        }
        Ok(self.0[[0, 0]])
    }
}

/// Flat target, always `(N,)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTarget(Array1<f64>);

impl FlatTarget {
    pub fn new(values: Array1<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn to_column(&self) -> ColumnTarget {
        ColumnTarget(self.0.clone().insert_axis(Axis(1)))
    }

    /// The only value of a `(1,)` target.
    pub fn single_value(&self, context: &str) -> Result<f64, ForecastError> {
        if self.len() != 1 {
            return Err(ForecastError::shape(context, "(1,)", format!("({},)", self.len())));
        }
        Ok(self.0[0])
    }
}

pub fn ensure_matching_rows(
    context: &str,
    feature_rows: usize,
    target_rows: usize,
) -> Result<(), ForecastError> {
    if feature_rows != target_rows {
        return Err(ForecastError::shape(
            context,
            format!("{} target rows", feature_rows),
            format!("{} target rows", target_rows),
        ));
    }
    Ok(())
}

/// `(samples, features)` -> `(samples, 1, features)`.
pub fn to_sequence_tensor(x: &Array2<f64>) -> Array3<f64> {
    x.view().insert_axis(Axis(1)).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_column_target_rejects_wide_matrix() {
        let err = ColumnTarget::new(Array2::zeros((4, 2))).unwrap_err();
        assert_eq!(err.kind(), "ShapeMismatchError");
    }

    #[test]
    fn test_column_target_accepts_single_column() {
        assert_eq!(ColumnTarget::new(Array2::zeros((5, 1))).unwrap().len(), 5);
    }

    #[test]
    fn test_explicit_conversions_preserve_values() {
        let column = ColumnTarget::from_values(&[1.0, 2.0, 3.0]);
        assert_eq!(column.view().shape(), &[3, 1]);

        let flat = column.to_flat();
        assert_eq!(flat.as_array(), &array![1.0, 2.0, 3.0]);
        assert_eq!(flat.to_column(), column);
    }

    #[test]
    fn test_single_value_requires_exactly_one() {
        assert_eq!(
            ColumnTarget::from_values(&[0.25]).single_value("seq").unwrap(),
            0.25
        );
        assert!(
            ColumnTarget::from_values(&[0.25, 0.5])
                .single_value("seq")
                .is_err()
        );
        assert!(FlatTarget::new(Array1::zeros(0)).single_value("tree").is_err());
    }

    #[test]
    fn test_sequence_tensor_shape() {
        let x = Array2::<f64>::zeros((7, 8));
        assert_eq!(to_sequence_tensor(&x).shape(), &[7, 1, 8]);
    }
}
