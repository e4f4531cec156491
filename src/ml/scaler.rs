use crate::error::{AppError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature standardization: `(x - mean) / std`, fitted once on training data.
///
/// Uses the population standard deviation. Constant columns get a unit
/// divisor so they map to zero instead of NaN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(features: &Array2<f64>) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(AppError::Model(
                "Cannot fit scaler on an empty feature matrix".to_string(),
            ));
        }

        let mean = features
            .mean_axis(Axis(0))
            .ok_or_else(|| AppError::Model("Failed to compute feature means".to_string()))?;
        let scale = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(AppError::Model(format!(
                "Scaler expects {} features, got {}",
                self.n_features(),
                features.ncols()
            )));
        }

        Ok((features - &self.mean) / &self.scale)
    }

    /// Scale a single observation into a 1 × n matrix
    pub fn transform_row(&self, row: &[f64]) -> Result<Array2<f64>> {
        let matrix = Array2::from_shape_vec((1, row.len()), row.to_vec())?;
        self.transform(&matrix)
    }

    pub fn fit_transform(features: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(features)?;
        let scaled = scaler.transform(features)?;
        Ok((scaler, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_centers_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&x).unwrap();

        assert_eq!(scaler.n_features(), 2);
        for col in scaled.columns() {
            assert!(col.sum().abs() < 1e-9);
        }
        assert!((scaled[[2, 0]] - 1.224_744_871).abs() < 1e-6);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();
        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[1, 0]], 0.0);
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_fit_rejects_empty() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&empty).is_err());
    }
}
