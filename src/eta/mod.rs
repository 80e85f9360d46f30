use std::sync::{Arc, RwLock};

use ndarray::Axis;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    bundle::ModelBundle,
    features::{self, Condition, build_features_checked},
    model::{self, ModelKind},
    route::{self, RouteTable},
    shared::{
        geo::{self, Coordinate},
        time::current_hour,
    },
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Geo error: {0}")]
    Geo(#[from] geo::Error),
    #[error("Route error: {0}")]
    Route(#[from] route::Error),
    #[error("Feature error: {0}")]
    Feature(#[from] features::Error),
    #[error("Model error: {0}")]
    Model(#[from] model::Error),
    #[error("No route table loaded")]
    RouteNotLoaded,
    #[error("No model bundle loaded")]
    BundleNotLoaded,
    #[error("Serving state lock was poisoned")]
    StatePoisoned,
}

/// The externally consumable result of one ETA request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtaEstimate {
    pub eta_minutes: f64,
    pub nearest_stop_name: String,
    pub remaining_km: f64,
}

/// Resolves the nearest stop, computes the remaining route distance and runs
/// the bundled scaler/model pair on the engineered features.
///
/// A negative regressor output is clamped to zero with a warning: regressors
/// can legally extrapolate below zero on out-of-distribution inputs, and a
/// rider is better served by "now" than by an error.
pub fn predict_eta(
    route: &RouteTable,
    bundle: &ModelBundle,
    coordinate: Coordinate,
    condition: Condition,
    hour: u8,
) -> Result<EtaEstimate, Error> {
    coordinate.validate()?;
    let stop = route.nearest_stop(&coordinate)?;
    let remaining_km = route.remaining_km(stop)?;
    let features = build_features_checked(remaining_km, condition, hour)?;
    let scaled = bundle.scaler().transform_one(features.to_array().view());

    let raw = match bundle.model_kind() {
        ModelKind::Tabular => bundle.model().predict_tabular(scaled.view())?,
        ModelKind::Sequence => {
            // A live request is a single timestep; the sequence model sees a
            // length-1 sequence of the same vector.
            let steps = scaled.view().insert_axis(Axis(0));
            bundle.model().predict_sequence(steps)?
        }
    };
    let eta_minutes = if raw < 0.0 {
        warn!(raw, stop = %stop.name, "Clamped negative ETA to zero");
        0.0
    } else {
        raw
    };

    Ok(EtaEstimate {
        eta_minutes,
        nearest_stop_name: stop.name.to_string(),
        remaining_km,
    })
}

/// Serving-side state: one route table and one active bundle, shared
/// read-only between requests.
///
/// Both are held behind an `Arc` that is swapped whole on reload, so an
/// in-flight request keeps the exact pairing it started with and never
/// observes a half-updated bundle. Clones share the same state.
#[derive(Clone, Default)]
pub struct EtaService {
    route: Arc<RwLock<Option<Arc<RouteTable>>>>,
    bundle: Arc<RwLock<Option<Arc<ModelBundle>>>>,
}

impl EtaService {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_route(self, route: RouteTable) -> Result<Self, Error> {
        self.install_route(route)?;
        Ok(self)
    }

    pub fn with_bundle(self, bundle: ModelBundle) -> Result<Self, Error> {
        self.install_bundle(bundle)?;
        Ok(self)
    }

    pub fn install_route(&self, route: RouteTable) -> Result<(), Error> {
        let mut slot = self.route.write().map_err(|_| Error::StatePoisoned)?;
        *slot = Some(Arc::new(route));
        Ok(())
    }

    /// Replaces the active bundle in one swap. Requests already holding the
    /// previous `Arc` finish against it.
    pub fn install_bundle(&self, bundle: ModelBundle) -> Result<(), Error> {
        let mut slot = self.bundle.write().map_err(|_| Error::StatePoisoned)?;
        *slot = Some(Arc::new(bundle));
        Ok(())
    }

    pub fn route(&self) -> Result<Arc<RouteTable>, Error> {
        self.route
            .read()
            .map_err(|_| Error::StatePoisoned)?
            .clone()
            .ok_or(Error::RouteNotLoaded)
    }

    pub fn bundle(&self) -> Result<Arc<ModelBundle>, Error> {
        self.bundle
            .read()
            .map_err(|_| Error::StatePoisoned)?
            .clone()
            .ok_or(Error::BundleNotLoaded)
    }

    pub fn predict(
        &self,
        coordinate: Coordinate,
        condition: Condition,
        hour: u8,
    ) -> Result<EtaEstimate, Error> {
        let route = self.route()?;
        let bundle = self.bundle()?;
        predict_eta(&route, &bundle, coordinate, condition, hour)
    }

    /// Same as [`EtaService::predict`] with the hour stamped from the local
    /// wall clock.
    pub fn predict_at_current_hour(
        &self,
        coordinate: Coordinate,
        condition: Condition,
    ) -> Result<EtaEstimate, Error> {
        self.predict(coordinate, condition, current_hour())
    }
}
