use ndarray::{Array1, Array2};
use transconnect::bundle::ModelBundle;
use transconnect::eta::{Error, EtaService, predict_eta};
use transconnect::features::Condition;
use transconnect::model::RecurrentParams;
use transconnect::route::{RouteTable, Stop};
use transconnect::shared::geo::Coordinate;
use transconnect::train::{Candidate, CandidateSpec, TrainConfig, train_and_select};

fn kabuga_route() -> RouteTable {
    let stops = vec![
        stop("Kabuga", 1, -1.949, 30.150, 0.0),
        stop("Mid", 2, -1.945, 30.100, 13.0),
        stop("Nyabugogo", 3, -1.940, 30.058, 26.0),
    ];
    RouteTable::from_stops(stops).unwrap()
}

fn stop(name: &str, position: u32, lat: f64, lon: f64, cumulative_km: f64) -> Stop {
    Stop {
        name: name.into(),
        position,
        coordinate: Coordinate {
            latitude: lat,
            longitude: lon,
        },
        cumulative_km,
    }
}

/// Noiseless corridor data, exactly linear in the features: 2 min/km plus
/// a flat 13 minute traffic penalty.
fn corridor_data(n: usize) -> (Array2<f64>, Array1<f64>) {
    let mut x = Array2::zeros((2 * n, 3));
    let mut y = Array1::zeros(2 * n);
    for i in 0..n {
        let distance = 26.0 * (i + 1) as f64 / n as f64;
        let hour = (6 + i % 14) as f64;
        for (row, flag) in [(i, 0.0), (n + i, 1.0)] {
            x[[row, 0]] = distance;
            x[[row, 1]] = flag;
            x[[row, 2]] = hour;
            y[row] = 2.0 * distance + 13.0 * flag;
        }
    }
    (x, y)
}

fn linear_bundle() -> ModelBundle {
    let (x, y) = corridor_data(50);
    let candidates = vec![Candidate::new("linear-regression", CandidateSpec::Linear)];
    let (bundle, _) = train_and_select(x, y, &candidates, &TrainConfig::default()).unwrap();
    bundle
}

#[test]
fn end_to_end_prediction_over_the_corridor() {
    let route = kabuga_route();
    let bundle = linear_bundle();

    // Standing at the middle stop with 13 km to go under traffic.
    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };
    let estimate = predict_eta(&route, &bundle, query, Condition::Traffic, 8).unwrap();

    assert_eq!(estimate.nearest_stop_name, "Mid");
    assert_eq!(estimate.remaining_km, 13.0);
    // The generator puts a traffic trip at 3 min/km; the linear fit must
    // land close on noiseless data.
    assert!(
        (estimate.eta_minutes - 39.0).abs() < 1.0,
        "got {}",
        estimate.eta_minutes
    );
}

#[test]
fn zero_remaining_distance_predicts_below_every_observed_trip() {
    let route = kabuga_route();
    let (x, y) = corridor_data(50);
    let min_observed = y.iter().cloned().fold(f64::INFINITY, f64::min);
    let candidates = vec![Candidate::new("linear-regression", CandidateSpec::Linear)];
    let (bundle, _) = train_and_select(x, y, &candidates, &TrainConfig::default()).unwrap();

    // Arriving at the terminal: remaining distance 0.
    let query = Coordinate {
        latitude: -1.940,
        longitude: 30.058,
    };
    let estimate = predict_eta(&route, &bundle, query, Condition::Normal, 8).unwrap();
    assert_eq!(estimate.remaining_km, 0.0);
    assert!(
        estimate.eta_minutes <= min_observed,
        "{} should not exceed {}",
        estimate.eta_minutes,
        min_observed
    );
}

#[test]
fn negative_extrapolation_is_clamped_to_zero() {
    let route = kabuga_route();

    // A target that is negative everywhere forces the regressor below zero.
    let (x, mut y) = corridor_data(50);
    y -= 500.0;
    let candidates = vec![Candidate::new("linear-regression", CandidateSpec::Linear)];
    let (bundle, _) = train_and_select(x, y, &candidates, &TrainConfig::default()).unwrap();

    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };
    let estimate = predict_eta(&route, &bundle, query, Condition::Normal, 12).unwrap();
    assert_eq!(estimate.eta_minutes, 0.0);
}

#[test]
fn sequence_bundle_serves_through_the_same_surface() {
    let route = kabuga_route();
    let (x, y) = corridor_data(50);
    let candidates = vec![Candidate::new(
        "recurrent-net",
        CandidateSpec::Recurrent(RecurrentParams {
            epochs: 100,
            ..Default::default()
        }),
    )];
    let (bundle, _) = train_and_select(x, y, &candidates, &TrainConfig::default()).unwrap();
    assert_eq!(
        bundle.model_kind(),
        transconnect::model::ModelKind::Sequence
    );

    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };
    let estimate = predict_eta(&route, &bundle, query, Condition::Traffic, 8).unwrap();
    assert!(estimate.eta_minutes.is_finite());
    assert!(estimate.eta_minutes >= 0.0);
}

#[test]
fn out_of_range_query_coordinates_are_rejected() {
    let route = kabuga_route();
    let bundle = linear_bundle();
    let query = Coordinate {
        latitude: 95.0,
        longitude: 30.0,
    };
    assert!(matches!(
        predict_eta(&route, &bundle, query, Condition::Normal, 8),
        Err(Error::Geo(_))
    ));
}

#[test]
fn out_of_range_hour_is_rejected() {
    let service = EtaService::new()
        .with_route(kabuga_route())
        .unwrap()
        .with_bundle(linear_bundle())
        .unwrap();
    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };
    assert!(matches!(
        service.predict(query, Condition::Normal, 24),
        Err(Error::Feature(_))
    ));
}

#[test]
fn service_refuses_to_predict_before_loading() {
    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };

    let empty = EtaService::new();
    assert!(matches!(
        empty.predict(query, Condition::Normal, 8),
        Err(Error::RouteNotLoaded)
    ));

    let route_only = EtaService::new().with_route(kabuga_route()).unwrap();
    assert!(matches!(
        route_only.predict(query, Condition::Normal, 8),
        Err(Error::BundleNotLoaded)
    ));
}

#[test]
fn installing_a_bundle_swaps_it_atomically() {
    let service = EtaService::new()
        .with_route(kabuga_route())
        .unwrap()
        .with_bundle(linear_bundle())
        .unwrap();
    let query = Coordinate {
        latitude: -1.945,
        longitude: 30.100,
    };
    let before = service.predict(query, Condition::Traffic, 8).unwrap();

    // An in-flight request holds its own handle on the active pairing.
    let held = service.bundle().unwrap();

    // Retrain on a slower corridor and swap.
    let (x, mut y) = corridor_data(50);
    y *= 2.0;
    let candidates = vec![Candidate::new("linear-regression", CandidateSpec::Linear)];
    let (slower, _) = train_and_select(x, y, &candidates, &TrainConfig::default()).unwrap();
    service.install_bundle(slower).unwrap();

    let after = service.predict(query, Condition::Traffic, 8).unwrap();
    assert!(
        after.eta_minutes > before.eta_minutes * 1.5,
        "swap must change predictions ({} -> {})",
        before.eta_minutes,
        after.eta_minutes
    );

    // The held pairing still answers exactly as before the swap.
    let route = service.route().unwrap();
    let replay = predict_eta(&route, &held, query, Condition::Traffic, 8).unwrap();
    assert_eq!(replay.eta_minutes, before.eta_minutes);
}
