use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::model::Error;

/// Per-feature affine transform (x - mean) / scale, fitted on the training
/// partition only. Zero-variance columns keep a scale of 1 so constant
/// features pass through centered instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, Error> {
        let means = x.mean_axis(Axis(0)).ok_or(Error::EmptyTrainingSet)?;
        let mut scales = x.std_axis(Axis(0), 0.0);
        scales.mapv_inplace(|s| if s > 0.0 { s } else { 1.0 });
        Ok(Self { means, scales })
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        (&x - &self.means) / &self.scales
    }

    pub fn transform_one(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &self.means) / &self.scales
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn scales(&self) -> &Array1<f64> {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn transform_centers_and_scales() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let scaled = scaler.transform(x.view());

        let means = scaled.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-12));
        // Second column has zero variance and must pass through centered.
        assert_eq!(scaler.scales()[1], 1.0);
        assert!(scaled.column(1).iter().all(|v| v.abs() < 1e-12));
    }
}
