use std::fmt::Display;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod boost;
mod forest;
mod linear;
mod recurrent;
mod scaler;
mod tree;

pub use boost::*;
pub use forest::*;
pub use linear::*;
pub use recurrent::*;
pub use scaler::*;
pub use tree::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Training data is empty")]
    EmptyTrainingSet,
    #[error("Feature matrix has {rows} rows but target vector has {targets}")]
    ShapeMismatch { rows: usize, targets: usize },
    #[error("Invalid hyperparameter for {name}: {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },
    #[error("Failed to fit {name}: {reason}")]
    Fit { name: &'static str, reason: String },
    #[error("A {model} model cannot serve a {requested} prediction")]
    KindMismatch {
        model: ModelKind,
        requested: ModelKind,
    },
}

/// Discriminates how a fitted model consumes features: `Tabular` models take
/// one flat vector, `Sequence` models take a (timesteps, features) matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Tabular,
    Sequence,
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Tabular => f.write_str("tabular"),
            ModelKind::Sequence => f.write_str("sequence"),
        }
    }
}

/// One fitted regressor, tagged by family so the persisted form is
/// self-describing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Model {
    Linear(LinearModel),
    Tree(RegressionTree),
    Forest(RandomForest),
    Boosted(GradientBoosting),
    Recurrent(RecurrentNet),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Recurrent(_) => ModelKind::Sequence,
            _ => ModelKind::Tabular,
        }
    }

    /// Predicts from one scaled feature vector. Sequence models reject this
    /// call; the caller must reshape and use [`Model::predict_sequence`].
    pub fn predict_tabular(&self, x: ArrayView1<f64>) -> Result<f64, Error> {
        match self {
            Model::Linear(model) => Ok(model.predict(x)),
            Model::Tree(model) => Ok(model.predict(x)),
            Model::Forest(model) => Ok(model.predict(x)),
            Model::Boosted(model) => Ok(model.predict(x)),
            Model::Recurrent(_) => Err(Error::KindMismatch {
                model: ModelKind::Sequence,
                requested: ModelKind::Tabular,
            }),
        }
    }

    /// Predicts from a (timesteps, features) sequence of scaled vectors.
    pub fn predict_sequence(&self, steps: ArrayView2<f64>) -> Result<f64, Error> {
        match self {
            Model::Recurrent(model) => Ok(model.predict(steps)),
            _ => Err(Error::KindMismatch {
                model: ModelKind::Tabular,
                requested: ModelKind::Sequence,
            }),
        }
    }
}
