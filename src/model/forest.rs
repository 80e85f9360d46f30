use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{Error, RegressionTree, TreeParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 200,
            max_depth: 10,
            min_leaf: 2,
            seed: 42,
        }
    }
}

/// Bagged-tree ensemble: every member is a depth-bounded tree fitted on a
/// bootstrap resample of the training partition. Each member derives its own
/// seed from the forest seed, so fitting in parallel stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        params: &ForestParams,
    ) -> Result<Self, Error> {
        if x.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        if params.trees == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "random forest",
                reason: "the ensemble needs at least one tree".into(),
            });
        }
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_leaf: params.min_leaf,
        };
        let n = x.nrows();
        let trees = (0..params.trees)
            .into_par_iter()
            .map(|member| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(member as u64));
                let mut sample_x = Array2::zeros((n, x.ncols()));
                let mut sample_y = Array1::zeros(n);
                for row in 0..n {
                    let pick = rng.gen_range(0..n);
                    sample_x.row_mut(row).assign(&x.row(pick));
                    sample_y[row] = y[pick];
                }
                RegressionTree::fit(sample_x.view(), sample_y.view(), &tree_params)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trees })
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        total / self.trees.len() as f64
    }
}
