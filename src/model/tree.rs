use std::cmp::Ordering;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::model::Error;

/// Thresholds closer than this to a sample value are not worth splitting on.
const SPLIT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_leaf: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Depth-bounded CART regressor. Splits minimize the summed squared error
/// of the two children; features are scanned in schema order and ties keep
/// the first candidate, so fitting is fully deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, params: &TreeParams) -> Result<Self, Error> {
        if x.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(Error::ShapeMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }
        if params.max_depth == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "decision tree",
                reason: "max_depth must be at least 1".into(),
            });
        }
        if params.min_leaf == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "decision tree",
                reason: "min_leaf must be at least 1".into(),
            });
        }
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = grow(&x, &y, &indices, params, 0);
        Ok(Self { root })
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn mean(y: &ArrayView1<f64>, indices: &[usize]) -> f64 {
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn grow(
    x: &ArrayView2<f64>,
    y: &ArrayView1<f64>,
    indices: &[usize],
    params: &TreeParams,
    depth: usize,
) -> Node {
    let value = mean(y, indices);
    if depth >= params.max_depth || indices.len() < 2 * params.min_leaf {
        return Node::Leaf { value };
    }
    match best_split(x, y, indices, params.min_leaf) {
        None => Node::Leaf { value },
        Some(split) => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x[[i, split.feature]] <= split.threshold);
            Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: Box::new(grow(x, y, &left_idx, params, depth + 1)),
                right: Box::new(grow(x, y, &right_idx, params, depth + 1)),
            }
        }
    }
}

struct SplitPoint {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Exhaustive scan over boundaries between distinct sorted values of each
/// feature, scored by the summed squared error of both children computed
/// from running prefix sums.
fn best_split(
    x: &ArrayView2<f64>,
    y: &ArrayView1<f64>,
    indices: &[usize],
    min_leaf: usize,
) -> Option<SplitPoint> {
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<SplitPoint> = None;
    for feature in 0..x.ncols() {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (count, window) in order.windows(2).enumerate() {
            let i = window[0];
            left_sum += y[i];
            left_sq += y[i] * y[i];
            let here = x[[i, feature]];
            let next = x[[window[1], feature]];
            if next - here <= SPLIT_EPS {
                continue;
            }
            let left_n = (count + 1) as f64;
            let right_n = n - left_n;
            if (left_n as usize) < min_leaf || (right_n as usize) < min_leaf {
                continue;
            }
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);
            if best.as_ref().is_none_or(|b| sse < b.sse - SPLIT_EPS) {
                best = Some(SplitPoint {
                    feature,
                    threshold: (here + next) / 2.0,
                    sse,
                });
            }
        }
    }
    best.filter(|b| b.sse < parent_sse - SPLIT_EPS)
}
