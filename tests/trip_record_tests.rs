use std::{env, fs, path::PathBuf};

use transconnect::features;
use transconnect::train::{self, design_matrix, load_trip_records};

fn temp_csv(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("transconnect-trips-{}-{}.csv", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_records_and_builds_the_design_matrix() {
    let path = temp_csv(
        "ok",
        "distance_km,condition,hour,travel_time_min\n\
         26.0,traffic,8,90.0\n\
         26.0,normal,11,50.0\n\
         13.0,normal,14,25.5\n",
    );
    let records = load_trip_records(&path).unwrap();
    assert_eq!(records.len(), 3);

    let (x, y) = design_matrix(&records).unwrap();
    assert_eq!(x.dim(), (3, features::SCHEMA.len()));
    assert_eq!(x[[0, 0]], 26.0);
    assert_eq!(x[[0, 1]], 1.0);
    assert_eq!(x[[0, 2]], 8.0);
    assert_eq!(x[[1, 1]], 0.0);
    assert_eq!(y[0], 90.0);
    assert_eq!(y[2], 25.5);
    fs::remove_file(path).unwrap();
}

#[test]
fn a_bad_condition_string_fails_like_the_serving_path() {
    let path = temp_csv(
        "bad-condition",
        "distance_km,condition,hour,travel_time_min\n\
         26.0,rush_hour,8,90.0\n",
    );
    let records = load_trip_records(&path).unwrap();
    assert!(matches!(
        design_matrix(&records),
        Err(train::Error::Feature(features::Error::InvalidCondition(_)))
    ));
    fs::remove_file(path).unwrap();
}

#[test]
fn an_out_of_range_hour_fails_like_the_serving_path() {
    let path = temp_csv(
        "bad-hour",
        "distance_km,condition,hour,travel_time_min\n\
         26.0,normal,25,90.0\n",
    );
    let records = load_trip_records(&path).unwrap();
    assert!(matches!(
        design_matrix(&records),
        Err(train::Error::Feature(features::Error::InvalidHour(25)))
    ));
    fs::remove_file(path).unwrap();
}

#[test]
fn unknown_columns_are_rejected() {
    let path = temp_csv(
        "extra-column",
        "distance_km,condition,hour,travel_time_min,weather\n\
         26.0,normal,8,90.0,sunny\n",
    );
    assert!(matches!(
        load_trip_records(&path),
        Err(train::Error::Csv(_))
    ));
    fs::remove_file(path).unwrap();
}
