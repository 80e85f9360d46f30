use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::model::{Error, RegressionTree, TreeParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostParams {
    pub stages: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_leaf: usize,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            stages: 200,
            learning_rate: 0.05,
            max_depth: 3,
            min_leaf: 2,
        }
    }
}

/// Gradient-boosted ensemble for squared loss: starts at the target mean and
/// fits each stage to the current residuals, shrunk by the learning rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradientBoosting {
    baseline: f64,
    learning_rate: f64,
    stages: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, params: &BoostParams) -> Result<Self, Error> {
        if x.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        if params.stages == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "gradient boosting",
                reason: "the ensemble needs at least one stage".into(),
            });
        }
        if !(params.learning_rate > 0.0 && params.learning_rate <= 1.0) {
            return Err(Error::InvalidHyperparameter {
                name: "gradient boosting",
                reason: format!("learning rate {} is outside (0, 1]", params.learning_rate),
            });
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_leaf: params.min_leaf,
        };
        let baseline = y.mean().ok_or(Error::EmptyTrainingSet)?;
        let mut current = Array1::from_elem(y.len(), baseline);
        let mut stages = Vec::with_capacity(params.stages);
        for _ in 0..params.stages {
            let residuals = &y - &current;
            let stage = RegressionTree::fit(x, residuals.view(), &tree_params)?;
            for (row, value) in current.iter_mut().enumerate() {
                *value += params.learning_rate * stage.predict(x.row(row));
            }
            stages.push(stage);
        }
        Ok(Self {
            baseline,
            learning_rate: params.learning_rate,
            stages,
        })
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let boost: f64 = self.stages.iter().map(|stage| stage.predict(x)).sum();
        self.baseline + self.learning_rate * boost
    }
}
