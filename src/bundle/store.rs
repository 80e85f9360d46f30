use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    bundle::{self, ModelBundle},
    features,
    model::{Model, ModelKind, StandardScaler},
};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ScalerSection {
    pairing_id: String,
    scaler: StandardScaler,
}

#[derive(Serialize, Deserialize)]
struct ModelSection {
    pairing_id: String,
    model: Model,
}

/// On-disk form of a bundle: one self-describing document. The pairing id
/// is repeated inside the scaler and model sections so a spliced document
/// (a scaler from one run, a model from another) fails validation.
#[derive(Serialize, Deserialize)]
struct BundleFile {
    format_version: u32,
    pairing_id: String,
    model_name: String,
    model_kind: ModelKind,
    feature_schema: Vec<String>,
    scaler: ScalerSection,
    model: ModelSection,
}

/// Persists bundles to one explicit path handed over at startup. There is
/// no directory scanning: the path names the artifact.
#[derive(Debug, Clone)]
pub struct BundleStore {
    path: PathBuf,
}

impl BundleStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic with respect to partial writes: the document is written to a
    /// sibling temp file and renamed over the target, so a crash mid-save
    /// never leaves a torn bundle where [`BundleStore::load`] finds it.
    pub fn save(&self, bundle: &ModelBundle) -> Result<(), bundle::Error> {
        let file = BundleFile {
            format_version: FORMAT_VERSION,
            pairing_id: bundle.pairing_id().to_string(),
            model_name: bundle.model_name().to_string(),
            model_kind: bundle.model_kind(),
            feature_schema: features::SCHEMA.iter().map(|s| s.to_string()).collect(),
            scaler: ScalerSection {
                pairing_id: bundle.pairing_id().to_string(),
                scaler: bundle.scaler().clone(),
            },
            model: ModelSection {
                pairing_id: bundle.pairing_id().to_string(),
                model: bundle.model().clone(),
            },
        };
        let json = serde_json::to_vec_pretty(&file)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = ?self.path, model = %bundle.model_name(), "Bundle saved");
        Ok(())
    }

    /// Loads and validates the bundle. Any integrity failure is fatal: a
    /// service must refuse to start rather than serve a guessed pairing.
    pub fn load(&self) -> Result<ModelBundle, bundle::Error> {
        let raw = fs::read(&self.path)?;
        let file: BundleFile = serde_json::from_slice(&raw)?;

        if file.format_version != FORMAT_VERSION {
            return Err(bundle::Error::UnsupportedVersion(file.format_version));
        }
        if file.scaler.pairing_id != file.pairing_id || file.model.pairing_id != file.pairing_id {
            return Err(bundle::Error::PairingMismatch {
                scaler: file.scaler.pairing_id,
                model: file.model.pairing_id,
            });
        }
        let expected: Vec<String> = features::SCHEMA.iter().map(|s| s.to_string()).collect();
        if file.feature_schema != expected {
            return Err(bundle::Error::SchemaMismatch {
                found: file.feature_schema,
                expected,
            });
        }
        let actual = file.model.model.kind();
        if actual != file.model_kind {
            return Err(bundle::Error::KindMismatch {
                recorded: file.model_kind,
                actual,
            });
        }

        info!(path = ?self.path, model = %file.model_name, "Bundle loaded");
        Ok(ModelBundle::new(
            file.pairing_id,
            file.model_name,
            file.scaler.scaler,
            file.model.model,
        ))
    }
}
