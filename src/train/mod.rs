use std::io;

use linfa::dataset::AsSingleTargets;
use linfa::prelude::*;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;
use tracing::{info, warn};

mod records;
pub use records::*;

use crate::{
    bundle::ModelBundle,
    features,
    model::{
        self, BoostParams, ForestParams, GradientBoosting, LinearModel, Model, ModelKind,
        RandomForest, RecurrentNet, RecurrentParams, RegressionTree, StandardScaler, TreeParams,
    },
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Feature error: {0}")]
    Feature(#[from] features::Error),
    #[error("Model error: {0}")]
    Model(#[from] model::Error),
    #[error("Training needs at least {min} samples, got {got}")]
    InsufficientData { got: usize, min: usize },
    #[error("Feature matrix has {rows} rows but target vector has {targets}")]
    ShapeMismatch { rows: usize, targets: usize },
    #[error("No candidate produced a usable model")]
    NoViableCandidate,
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Seed for the shuffle, the bootstrap resamples and the pairing id, so
    /// a run is reproducible end to end.
    pub seed: u64,
    pub test_fraction: f32,
    pub min_samples: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.25,
            min_samples: 10,
        }
    }
}

/// Hyperparameters for one estimator family.
#[derive(Debug, Clone)]
pub enum CandidateSpec {
    Linear,
    Tree(TreeParams),
    Forest(ForestParams),
    Boosted(BoostParams),
    Recurrent(RecurrentParams),
}

/// One entry of the declarative candidate list. Adding or removing an
/// estimator is a data change, not a new training path.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub spec: CandidateSpec,
}

impl Candidate {
    pub fn new(name: &str, spec: CandidateSpec) -> Self {
        Self {
            name: name.to_string(),
            spec,
        }
    }
}

/// The candidate roster benchmarked by default.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("linear-regression", CandidateSpec::Linear),
        Candidate::new("decision-tree", CandidateSpec::Tree(TreeParams::default())),
        Candidate::new("random-forest", CandidateSpec::Forest(ForestParams::default())),
        Candidate::new(
            "gradient-boosting",
            CandidateSpec::Boosted(BoostParams::default()),
        ),
        Candidate::new(
            "recurrent-net",
            CandidateSpec::Recurrent(RecurrentParams::default()),
        ),
    ]
}

/// Held-out scores for one candidate. Used to rank candidates and returned
/// for audit; never persisted.
#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub name: String,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub predictions: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub name: String,
    pub reason: String,
}

/// Everything the selection run produced besides the winning bundle.
#[derive(Debug, Clone, Default)]
pub struct TrainReport {
    pub records: Vec<EvaluationRecord>,
    pub failures: Vec<CandidateFailure>,
}

/// Benchmarks every candidate on an identical split and returns the best one
/// bundled with the scaler it was fitted against.
///
/// The split is shuffled with the configured seed and held at the configured
/// test fraction; the scaler is fitted on the training partition only and
/// applied to both. Candidates are ranked by R² descending with RMSE
/// ascending as the tie break. A candidate that fails to fit, fails to
/// predict, or produces non-finite scores is recorded as a failure and
/// excluded instead of aborting the run.
pub fn train_and_select(
    x: Array2<f64>,
    y: Array1<f64>,
    candidates: &[Candidate],
    config: &TrainConfig,
) -> Result<(ModelBundle, TrainReport), Error> {
    let rows = x.nrows();
    if rows != y.len() {
        return Err(Error::ShapeMismatch {
            rows,
            targets: y.len(),
        });
    }
    if rows < config.min_samples {
        return Err(Error::InsufficientData {
            got: rows,
            min: config.min_samples,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let dataset = Dataset::new(x, y).shuffle(&mut rng);
    let (train, valid) = dataset.split_with_ratio(1.0 - config.test_fraction);

    let scaler = StandardScaler::fit(train.records.view())?;
    let train_x = scaler.transform(train.records.view());
    let valid_x = scaler.transform(valid.records.view());
    let train_y = train.as_single_targets().to_owned();
    let scaled_valid = Dataset::new(valid_x.clone(), valid.as_single_targets().to_owned());

    let mut report = TrainReport::default();
    let mut fitted: Vec<Model> = Vec::new();
    for candidate in candidates {
        match evaluate_candidate(candidate, &train_x, &train_y, &valid_x, &scaled_valid) {
            Ok((record, model)) => {
                info!(
                    name = %candidate.name,
                    rmse = record.rmse,
                    r2 = record.r2,
                    "Candidate evaluated"
                );
                report.records.push(record);
                fitted.push(model);
            }
            Err(reason) => {
                warn!(name = %candidate.name, reason = %reason, "Candidate excluded");
                report.failures.push(CandidateFailure {
                    name: candidate.name.clone(),
                    reason,
                });
            }
        }
    }
    if report.records.is_empty() {
        return Err(Error::NoViableCandidate);
    }

    let mut order: Vec<usize> = (0..report.records.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = &report.records[a];
        let rb = &report.records[b];
        rb.r2.total_cmp(&ra.r2).then(ra.rmse.total_cmp(&rb.rmse))
    });
    let winner = order[0];
    let model = fitted.swap_remove(winner);
    let best = &report.records[winner];
    info!(name = %best.name, r2 = best.r2, rmse = best.rmse, "Best candidate selected");

    let pairing_id = format!("{:016x}", rng.r#gen::<u64>());
    let bundle = ModelBundle::new(pairing_id, best.name.clone(), scaler, model);
    Ok((bundle, report))
}

fn evaluate_candidate(
    candidate: &Candidate,
    train_x: &Array2<f64>,
    train_y: &Array1<f64>,
    valid_x: &Array2<f64>,
    scaled_valid: &Dataset<f64, f64, ndarray::Ix1>,
) -> Result<(EvaluationRecord, Model), String> {
    let model = fit_candidate(&candidate.spec, train_x, train_y).map_err(|e| e.to_string())?;
    let predictions = predict_holdout(&model, valid_x).map_err(|e| e.to_string())?;

    let mae = predictions
        .mean_absolute_error(scaled_valid)
        .map_err(|e| e.to_string())?;
    let mse = predictions
        .mean_squared_error(scaled_valid)
        .map_err(|e| e.to_string())?;
    let rmse = mse.sqrt();
    let r2 = predictions.r2(scaled_valid).map_err(|e| e.to_string())?;
    if !(mae.is_finite() && rmse.is_finite() && r2.is_finite()) {
        return Err("non-finite evaluation scores".to_string());
    }

    Ok((
        EvaluationRecord {
            name: candidate.name.clone(),
            mae,
            mse,
            rmse,
            r2,
            predictions,
        },
        model,
    ))
}

fn fit_candidate(
    spec: &CandidateSpec,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<Model, model::Error> {
    match spec {
        CandidateSpec::Linear => LinearModel::fit(x, y).map(Model::Linear),
        CandidateSpec::Tree(params) => {
            RegressionTree::fit(x.view(), y.view(), params).map(Model::Tree)
        }
        CandidateSpec::Forest(params) => {
            RandomForest::fit(x.view(), y.view(), params).map(Model::Forest)
        }
        CandidateSpec::Boosted(params) => {
            GradientBoosting::fit(x.view(), y.view(), params).map(Model::Boosted)
        }
        CandidateSpec::Recurrent(params) => {
            RecurrentNet::fit(x.view(), y.view(), params).map(Model::Recurrent)
        }
    }
}

/// Holdout predictions with the same kind dispatch the serving path uses:
/// tabular models see flat rows, sequence models see length-1 sequences.
fn predict_holdout(model: &Model, x: &Array2<f64>) -> Result<Array1<f64>, model::Error> {
    let mut out = Array1::zeros(x.nrows());
    match model.kind() {
        ModelKind::Tabular => {
            for (row, features) in x.rows().into_iter().enumerate() {
                out[row] = model.predict_tabular(features)?;
            }
        }
        ModelKind::Sequence => {
            for row in 0..x.nrows() {
                let steps = x.row(row).insert_axis(Axis(0));
                out[row] = model.predict_sequence(steps)?;
            }
        }
    }
    Ok(out)
}
