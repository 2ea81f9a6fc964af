//! Geographic primitives: the [`Coordinate`] value type and geodesic distance.
//!
//! Distances are measured on the WGS-84 ellipsoid with Vincenty's inverse
//! formula. Near-antipodal pairs where the iteration fails to converge fall
//! back to a spherical haversine estimate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// WGS-84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Mean Earth radius (IUGG) in kilometres, used by the haversine fallback.
const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// A latitude/longitude pair in decimal degrees.
///
/// Field order is always (lat, lng). Boundaries that expect the opposite
/// order (OSRM URLs, GeoJSON) convert explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Geodesic distance to `other` in kilometres.
    pub fn geodesic_distance_km(&self, other: &Coordinate) -> f64 {
        geodesic_distance_km(*self, *other)
    }

    /// `"lng,lat"` as used in OSRM path segments.
    pub fn to_lng_lat_string(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }

    /// Bit-exact key, usable in hash maps where `f64` is not `Eq`.
    pub(crate) fn bits(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Ellipsoidal distance between two points in kilometres.
pub fn geodesic_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    vincenty_inverse_m(a, b)
        .map(|metres| metres / 1000.0)
        .unwrap_or_else(|| haversine_distance_km(a, b))
}

/// Great-circle distance on a sphere of mean Earth radius, in kilometres.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    MEAN_EARTH_RADIUS_KM * c
}

/// Vincenty inverse solution in metres. `None` when the iteration does not converge.
fn vincenty_inverse_m(a: Coordinate, b: Coordinate) -> Option<f64> {
    let semi_minor = (1.0 - WGS84_F) * WGS84_A;

    let l = (b.lng - a.lng).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross.powi(2)).sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if lambda.abs() > std::f64::consts::PI {
            return None;
        }
        if (lambda - lambda_prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - semi_minor.powi(2)) / semi_minor.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            let metres = semi_minor * big_a * (sigma - delta_sigma);
            return metres.is_finite().then_some(metres);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_apart() {
        let p = Coordinate::new(13.0, 80.2);
        assert_eq!(p.geodesic_distance_km(&p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_at_equator_matches_ellipsoid() {
        // Meridian arc 0°..1° on WGS-84 is 110.574 km.
        let d = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 110.574).abs() < 0.01, "got {d}");
    }

    #[test]
    fn flinders_peak_to_buninyong_reference() {
        // Vincenty's published test line: 54972.271 m.
        let flinders = Coordinate::new(-37.951_033_416_7, 144.424_867_888_9);
        let buninyong = Coordinate::new(-37.652_821_138_9, 143.926_495_527_8);
        let d = geodesic_distance_km(flinders, buninyong);
        assert!((d - 54.972_271).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(12.9716, 80.2210);
        let b = Coordinate::new(13.0600, 80.2400);
        let ab = geodesic_distance_km(a, b);
        let ba = geodesic_distance_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn near_antipodal_points_yield_finite_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.5, 179.7);
        let d = geodesic_distance_km(a, b);
        assert!(d.is_finite());
        assert!(d > 19_000.0 && d < 20_100.0, "got {d}");
    }

    #[test]
    fn haversine_and_vincenty_agree_at_city_scale() {
        let a = Coordinate::new(12.9716, 80.2210);
        let b = Coordinate::new(13.0500, 80.2500);
        let ellipsoid = geodesic_distance_km(a, b);
        let sphere = haversine_distance_km(a, b);
        assert!((ellipsoid - sphere).abs() / ellipsoid < 0.01);
    }
}
