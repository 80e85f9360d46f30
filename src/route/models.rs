use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::geo::Coordinate;

/// One row of the route-stop CSV artifact produced by the preprocessing
/// pipeline. Column order and names are part of the file contract.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouteStopRecord {
    pub stop_name: String,
    pub stop_sequence: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub cumulative_distance_km: f64,
}

/// A fixed geographic point along the route. Built once by the loader and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Stop {
    /// The display name of the stop.
    pub name: Arc<str>,
    /// 1-based position along the route, contiguous and strictly increasing.
    pub position: u32,
    pub coordinate: Coordinate,
    /// Distance travelled from the route origin up to this stop, in km.
    pub cumulative_km: f64,
}

impl From<RouteStopRecord> for Stop {
    fn from(value: RouteStopRecord) -> Self {
        Self {
            name: value.stop_name.into(),
            position: value.stop_sequence,
            coordinate: Coordinate {
                latitude: value.latitude,
                longitude: value.longitude,
            },
            cumulative_km: value.cumulative_distance_km,
        }
    }
}
