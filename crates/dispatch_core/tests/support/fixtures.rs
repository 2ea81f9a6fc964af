use dispatch_core::geo::Coordinate;
use dispatch_core::routing::Route;
use dispatch_core::test_helpers::fixture_path;

/// Ambulance candidates used by the resolver scenarios.
pub fn scenario_candidates() -> Vec<Coordinate> {
    vec![
        Coordinate::new(12.9716, 80.2210),
        Coordinate::new(13.0500, 80.2500),
        Coordinate::new(12.9900, 80.1800),
    ]
}

pub fn scenario_query() -> Coordinate {
    Coordinate::new(13.00, 80.20)
}

/// Route matching the stubbed 5 km / 10 min OSRM response.
pub fn fixture_route() -> Route {
    Route {
        path: fixture_path(),
        distance_km: 5.0,
        duration_min: 10.0,
    }
}

pub fn assert_path_close(actual: &[Coordinate], expected: &[Coordinate]) {
    assert_eq!(actual.len(), expected.len(), "path length");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a.lat - e.lat).abs() < 1e-9, "{a} vs {e}");
        assert!((a.lng - e.lng).abs() < 1e-9, "{a} vs {e}");
    }
}
