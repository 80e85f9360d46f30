use std::{fmt::Display, str::FromStr};

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feature columns in contract order. Every consumer of a feature vector
/// (scaler, model) receives values in exactly this order; the schema is
/// persisted inside each model bundle and re-checked at load so a reordered
/// producer fails loudly instead of silently corrupting predictions.
pub const SCHEMA: [&str; 3] = ["distance_km", "is_traffic", "hour_of_day"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown traffic condition {0:?}, expected \"normal\" or \"traffic\"")]
    InvalidCondition(String),
    #[error("Hour {0} is outside [0, 23]")]
    InvalidHour(u8),
    #[error("Distance {0} km is negative")]
    NegativeDistance(f64),
}

/// The two-valued traffic domain. Parsing is exact and case-sensitive:
/// anything that is not "normal" or "traffic" is an error, never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Normal,
    Traffic,
}

impl Condition {
    pub fn flag(&self) -> f64 {
        match self {
            Condition::Normal => 0.0,
            Condition::Traffic => 1.0,
        }
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Condition::Normal),
            "traffic" => Ok(Condition::Traffic),
            other => Err(Error::InvalidCondition(other.to_string())),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Normal => f.write_str("normal"),
            Condition::Traffic => f.write_str("traffic"),
        }
    }
}

/// Engineered features for one prediction, in [`SCHEMA`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub distance_km: f64,
    pub is_traffic: f64,
    pub hour_of_day: f64,
}

impl FeatureVector {
    /// The vector as a dense row in [`SCHEMA`] order.
    pub fn to_array(self) -> Array1<f64> {
        Array1::from_vec(vec![self.distance_km, self.is_traffic, self.hour_of_day])
    }
}

/// Turns raw inputs into the fixed-order feature vector, validating each
/// field before any computation happens.
pub fn build_features(distance_km: f64, condition: &str, hour: u8) -> Result<FeatureVector, Error> {
    let condition: Condition = condition.parse()?;
    build_features_checked(distance_km, condition, hour)
}

/// Same as [`build_features`] for callers that already hold a parsed
/// [`Condition`].
pub fn build_features_checked(
    distance_km: f64,
    condition: Condition,
    hour: u8,
) -> Result<FeatureVector, Error> {
    if distance_km < 0.0 || distance_km.is_nan() {
        return Err(Error::NegativeDistance(distance_km));
    }
    if hour > 23 {
        return Err(Error::InvalidHour(hour));
    }
    Ok(FeatureVector {
        distance_km,
        is_traffic: condition.flag(),
        hour_of_day: hour as f64,
    })
}
