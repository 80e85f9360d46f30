use std::io;

use thiserror::Error;
use tracing::info;

mod loader;
mod models;
pub use loader::*;
pub use models::*;

use crate::shared::geo::{self, Coordinate};

/// Two stops closer than this are considered the same physical stop.
const DUPLICATE_STOP_TOLERANCE_M: f64 = 1.0;

/// Tolerance when comparing cumulative distances read from the artifact.
const CUMULATIVE_EPS_KM: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Geo error: {0}")]
    Geo(#[from] geo::Error),
    #[error("Route table has no stops")]
    EmptyRoute,
    #[error("Stop positions must start at 1 and be contiguous, found {found} at index {index}")]
    NonContiguousPosition { index: usize, found: u32 },
    #[error("Route origin must have cumulative distance 0, found {0}")]
    OriginNotAtZero(f64),
    #[error("Cumulative distance decreases at position {position}: {previous} -> {current}")]
    NonMonotonicDistance {
        position: u32,
        previous: f64,
        current: f64,
    },
    #[error("Stops {first} and {second} share the same location")]
    DuplicateCoordinate { first: u32, second: u32 },
    #[error("Stop at position {0} is not part of this route table")]
    StopNotInRoute(u32),
}

/// The ordered collection of all stops for one route, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    stops: Box<[Stop]>,
}

impl RouteTable {
    /// Builds a table from unordered stops, sorting by position and
    /// enforcing every invariant of the artifact: contiguous 1-based
    /// positions, origin at cumulative 0, non-decreasing cumulative
    /// distance, valid coordinates and no co-located stops.
    pub fn from_stops(mut stops: Vec<Stop>) -> Result<Self, Error> {
        if stops.is_empty() {
            return Err(Error::EmptyRoute);
        }
        stops.sort_by_key(|stop| stop.position);

        for (index, stop) in stops.iter().enumerate() {
            stop.coordinate.validate()?;
            if stop.position != index as u32 + 1 {
                return Err(Error::NonContiguousPosition {
                    index,
                    found: stop.position,
                });
            }
        }
        if stops[0].cumulative_km.abs() > CUMULATIVE_EPS_KM {
            return Err(Error::OriginNotAtZero(stops[0].cumulative_km));
        }
        for pair in stops.windows(2) {
            if pair[1].cumulative_km < pair[0].cumulative_km - CUMULATIVE_EPS_KM {
                return Err(Error::NonMonotonicDistance {
                    position: pair[1].position,
                    previous: pair[0].cumulative_km,
                    current: pair[1].cumulative_km,
                });
            }
        }
        for (i, a) in stops.iter().enumerate() {
            for b in stops.iter().skip(i + 1) {
                if a.coordinate.distance_m(&b.coordinate) < DUPLICATE_STOP_TOLERANCE_M {
                    return Err(Error::DuplicateCoordinate {
                        first: a.position,
                        second: b.position,
                    });
                }
            }
        }

        info!(
            stops = stops.len(),
            length_km = stops[stops.len() - 1].cumulative_km,
            "Route table loaded"
        );
        Ok(Self {
            stops: stops.into(),
        })
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The route origin (position 1).
    pub fn origin(&self) -> &Stop {
        &self.stops[0]
    }

    /// The terminal stop, whose cumulative distance is the route length.
    pub fn terminal(&self) -> &Stop {
        &self.stops[self.stops.len() - 1]
    }

    pub fn total_km(&self) -> f64 {
        self.terminal().cumulative_km
    }

    /// Resolves the stop closest to `coordinate` by geodesic distance.
    ///
    /// This is a linear scan, O(n) in the number of stops. Route tables are
    /// small (tens of stops); a larger table would want a spatial index.
    /// Ties resolve to the lowest position because the scan walks the table
    /// in position order and only replaces on a strictly smaller distance.
    pub fn nearest_stop(&self, coordinate: &Coordinate) -> Result<&Stop, Error> {
        let mut best: Option<(&Stop, f64)> = None;
        for stop in self.stops.iter() {
            let distance = stop.coordinate.distance_km(coordinate);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((stop, distance)),
            }
        }
        best.map(|(stop, _)| stop).ok_or(Error::EmptyRoute)
    }

    /// Route length minus the cumulative distance of `stop`. Zero only at
    /// the terminal stop.
    ///
    /// The stop must belong to this table; a stop carried over from another
    /// (or stale) table is rejected rather than silently producing a wrong
    /// distance.
    pub fn remaining_km(&self, stop: &Stop) -> Result<f64, Error> {
        let entry = (stop.position as usize)
            .checked_sub(1)
            .and_then(|index| self.stops.get(index))
            .filter(|entry| (entry.cumulative_km - stop.cumulative_km).abs() <= CUMULATIVE_EPS_KM)
            .ok_or(Error::StopNotInRoute(stop.position))?;
        Ok(self.total_km() - entry.cumulative_km)
    }
}
