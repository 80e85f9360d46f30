use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside the valid
    /// latitude/longitude ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Haversine great-circle distance in kilometers.
    pub fn distance_km(&self, coord: &Self) -> f64 {
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        EARTH_RADIUS_KM * c
    }

    pub fn distance_m(&self, coord: &Self) -> f64 {
        self.distance_km(coord) * 1000.0
    }
}

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.distance_km(&coord_b);
    assert!((d - 343.0).abs() < 5.0);
}

#[test]
fn distance_symmetry_test() {
    let coord_a = Coordinate {
        latitude: -1.949,
        longitude: 30.150,
    };
    let coord_b = Coordinate {
        latitude: -1.940,
        longitude: 30.058,
    };
    assert_eq!(coord_a.distance_km(&coord_b), coord_b.distance_km(&coord_a));
}

#[test]
fn invalid_latitude_test() {
    assert!(Coordinate::new(91.0, 0.0).is_err());
    assert!(Coordinate::new(-90.5, 0.0).is_err());
    assert!(Coordinate::new(0.0, 180.5).is_err());
    assert!(Coordinate::new(f64::NAN, 0.0).is_err());
}
