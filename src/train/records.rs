use std::{fs::File, path::Path};

use csv::Reader;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{features, train};

/// One historical trip observation, the second input artifact of the system.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TripRecord {
    pub distance_km: f64,
    pub condition: String,
    pub hour: u8,
    pub travel_time_min: f64,
}

/// Loads the historical trip CSV artifact from disk.
pub fn load_trip_records<P: AsRef<Path>>(path: P) -> Result<Vec<TripRecord>, train::Error> {
    let file = File::open(path)?;
    let mut rdr = Reader::from_reader(file);
    let mut records: Vec<TripRecord> = Vec::new();
    for result in rdr.deserialize() {
        let record: TripRecord = result?;
        records.push(record);
    }
    info!(records = records.len(), "Trip records loaded");
    Ok(records)
}

/// Builds the design matrix and target vector. Every row goes through the
/// feature builder, so an invalid condition string or hour fails with the
/// same typed error the serving path would raise.
pub fn design_matrix(
    records: &[TripRecord],
) -> Result<(Array2<f64>, Array1<f64>), train::Error> {
    let mut x = Array2::zeros((records.len(), features::SCHEMA.len()));
    let mut y = Array1::zeros(records.len());
    for (row, record) in records.iter().enumerate() {
        let features = features::build_features(record.distance_km, &record.condition, record.hour)?;
        x.row_mut(row).assign(&features.to_array());
        y[row] = record.travel_time_min;
    }
    Ok((x, y))
}
