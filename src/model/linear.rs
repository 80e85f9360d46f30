use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::model::Error;

/// Ordinary least squares, fitted through linfa and persisted as explicit
/// weights so the artifact stays a plain document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, Error> {
        if x.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        let dataset = Dataset::new(x.clone(), y.clone());
        let fitted = LinearRegression::new()
            .fit(&dataset)
            .map_err(|err| Error::Fit {
                name: "linear regression",
                reason: err.to_string(),
            })?;
        Ok(Self {
            weights: fitted.params().to_owned(),
            intercept: fitted.intercept(),
        })
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        self.weights.dot(&x) + self.intercept
    }
}
