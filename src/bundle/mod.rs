use std::io;

use thiserror::Error;

mod store;
pub use store::*;

use crate::model::{Model, ModelKind, StandardScaler};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bundle format version {0} is not supported")]
    UnsupportedVersion(u32),
    #[error("Scaler and model were not produced together (pairing {scaler} vs {model})")]
    PairingMismatch { scaler: String, model: String },
    #[error("Persisted feature schema {found:?} does not match {expected:?}")]
    SchemaMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error("Persisted model kind {recorded} does not match the model, which is {actual}")]
    KindMismatch {
        recorded: ModelKind,
        actual: ModelKind,
    },
}

/// The persisted pairing of a fitted scaler and the one regressor that was
/// fitted against its output, plus metadata identifying the regressor.
///
/// A bundle is only ever created whole (by the trainer or a validated load)
/// and replaced whole; the scaler can never drift apart from its model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pairing_id: String,
    model_name: String,
    model_kind: ModelKind,
    scaler: StandardScaler,
    model: Model,
}

impl ModelBundle {
    pub fn new(pairing_id: String, model_name: String, scaler: StandardScaler, model: Model) -> Self {
        let model_kind = model.kind();
        Self {
            pairing_id,
            model_name,
            model_kind,
            scaler,
            model,
        }
    }

    pub fn pairing_id(&self) -> &str {
        &self.pairing_id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_kind(&self) -> ModelKind {
        self.model_kind
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}
