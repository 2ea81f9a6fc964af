//! Simulated accident locations drawn uniformly from a bounding box.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Default region: Chennai, India (approx).
const DEFAULT_LAT_MIN: f64 = 12.90;
const DEFAULT_LAT_MAX: f64 = 13.15;
const DEFAULT_LNG_MIN: f64 = 80.10;
const DEFAULT_LNG_MAX: f64 = 80.35;

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
        }
    }
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.lat)
            && (self.lng_min..=self.lng_max).contains(&point.lng)
    }

    /// Midpoint of the box, handy as a map/report anchor.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.lat_min + self.lat_max) * 0.5,
            (self.lng_min + self.lng_max) * 0.5,
        )
    }

    /// True when both ranges are finite and non-inverted.
    pub fn is_valid(&self) -> bool {
        [self.lat_min, self.lat_max, self.lng_min, self.lng_max]
            .iter()
            .all(|v| v.is_finite())
            && self.lat_min <= self.lat_max
            && self.lng_min <= self.lng_max
    }
}

/// Generate an incident in the default region using the thread-local RNG.
pub fn generate_incident() -> Coordinate {
    generate_incident_in(&mut rand::thread_rng(), &BoundingBox::default())
}

/// Generate an incident uniformly inside `region`.
///
/// `region` must satisfy [`BoundingBox::is_valid`]; config loading enforces this.
pub fn generate_incident_in<R: Rng + ?Sized>(rng: &mut R, region: &BoundingBox) -> Coordinate {
    let lat = rng.gen_range(region.lat_min..=region.lat_max);
    let lng = rng.gen_range(region.lng_min..=region.lng_max);
    Coordinate::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_incidents_stay_in_default_region() {
        let region = BoundingBox::default();
        for _ in 0..1_000 {
            let incident = generate_incident();
            assert!(region.contains(&incident), "{incident} escaped region");
        }
    }

    #[test]
    fn same_seed_gives_same_incident() {
        let region = BoundingBox::default();
        let a = generate_incident_in(&mut StdRng::seed_from_u64(7), &region);
        let b = generate_incident_in(&mut StdRng::seed_from_u64(7), &region);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_box_yields_its_single_point() {
        let region = BoundingBox::new(13.0, 13.0, 80.2, 80.2);
        let incident = generate_incident_in(&mut StdRng::seed_from_u64(1), &region);
        assert_eq!(incident, Coordinate::new(13.0, 80.2));
    }

    #[test]
    fn inverted_box_is_invalid() {
        assert!(BoundingBox::default().is_valid());
        assert!(!BoundingBox::new(13.1, 12.9, 80.1, 80.3).is_valid());
        assert!(!BoundingBox::new(f64::NAN, 12.9, 80.1, 80.3).is_valid());
    }
}
