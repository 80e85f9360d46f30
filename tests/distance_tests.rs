use transconnect::shared::geo::Coordinate;

#[test]
fn distance_is_zero_for_identical_points() {
    let coord = Coordinate {
        latitude: -1.949,
        longitude: 30.150,
    };
    assert_eq!(coord.distance_km(&coord), 0.0);
}

#[test]
fn distance_is_symmetric() {
    let coord_a = Coordinate {
        latitude: -1.949,
        longitude: 30.150,
    };
    let coord_b = Coordinate {
        latitude: -1.940,
        longitude: 30.058,
    };
    assert_eq!(coord_a.distance_km(&coord_b), coord_b.distance_km(&coord_a));
    assert!(coord_a.distance_km(&coord_b) > 0.0);
}

#[test]
fn distance_matches_a_known_pair() {
    // Paris to London is roughly 343 km great-circle.
    let paris = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };
    let london = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = paris.distance_km(&london);
    assert!((d - 343.0).abs() < 5.0, "got {d} km");
}

#[test]
fn out_of_range_coordinates_are_rejected() {
    assert!(Coordinate::new(90.1, 0.0).is_err());
    assert!(Coordinate::new(-91.0, 0.0).is_err());
    assert!(Coordinate::new(0.0, 180.1).is_err());
    assert!(Coordinate::new(0.0, -181.0).is_err());
    assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
    assert!(Coordinate::new(90.0, -180.0).is_ok());
}
