//! Nearest-facility resolution by geodesic distance.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::facilities::{FacilityKind, FacilityRoster};
use crate::geo::Coordinate;

/// Facilities assigned to one incident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub ambulance: Coordinate,
    pub hospital: Coordinate,
}

/// Return the candidate closest to `query`.
///
/// Equidistant candidates resolve to the earliest one in `candidates`.
pub fn resolve_nearest(
    query: Coordinate,
    candidates: &[Coordinate],
) -> Result<Coordinate, DispatchError> {
    let (idx, _) = resolve_nearest_index(query, candidates)?;
    Ok(candidates[idx])
}

/// Index and distance (km) of the closest candidate.
pub fn resolve_nearest_index(
    query: Coordinate,
    candidates: &[Coordinate],
) -> Result<(usize, f64), DispatchError> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        let distance = query.geodesic_distance_km(candidate);
        best = match best {
            // Strict comparison keeps the first of equal candidates.
            Some((_, best_distance)) if distance >= best_distance => best,
            _ if distance.is_nan() => best,
            _ => Some((idx, distance)),
        };
    }

    match best {
        Some(found) => Ok(found),
        None if candidates.is_empty() => Err(DispatchError::InvalidInput(
            "candidate set is empty".to_string(),
        )),
        None => Err(DispatchError::InvalidInput(
            "no candidate has a finite distance to the query".to_string(),
        )),
    }
}

/// Assign the nearest ambulance and hospital to an incident.
pub fn assign(incident: Coordinate, roster: &FacilityRoster) -> Result<Assignment, DispatchError> {
    let ambulance = resolve_kind(incident, roster, FacilityKind::Ambulance)?;
    let hospital = resolve_kind(incident, roster, FacilityKind::Hospital)?;
    Ok(Assignment {
        ambulance,
        hospital,
    })
}

fn resolve_kind(
    incident: Coordinate,
    roster: &FacilityRoster,
    kind: FacilityKind,
) -> Result<Coordinate, DispatchError> {
    resolve_nearest(incident, roster.candidates(kind)).map_err(|err| match err {
        DispatchError::InvalidInput(msg) => DispatchError::InvalidInput(format!("{kind}: {msg}")),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facilities::AMBULANCES;

    #[test]
    fn picks_closest_fixture_ambulance() {
        let nearest = resolve_nearest(Coordinate::new(13.00, 80.20), &AMBULANCES).expect("nearest");
        assert_eq!(nearest, Coordinate::new(12.9900, 80.1800));
    }

    #[test]
    fn empty_candidates_are_invalid_input() {
        for _ in 0..10 {
            let err = resolve_nearest(Coordinate::new(13.0, 80.2), &[]).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidInput(_)));
        }
    }

    #[test]
    fn ties_resolve_to_first_in_order() {
        // Mirror images across the query's meridian are equidistant.
        let query = Coordinate::new(13.0, 80.0);
        let east = Coordinate::new(13.0, 80.25);
        let west = Coordinate::new(13.0, 79.75);
        assert_eq!(resolve_nearest(query, &[east, west]).expect("nearest"), east);
        assert_eq!(resolve_nearest(query, &[west, east]).expect("nearest"), west);
    }

    #[test]
    fn duplicate_candidates_keep_first_index() {
        let query = Coordinate::new(13.0, 80.2);
        let p = Coordinate::new(13.01, 80.21);
        let (idx, _) = resolve_nearest_index(query, &[p, p, p]).expect("nearest");
        assert_eq!(idx, 0);
    }

    #[test]
    fn nan_candidates_are_skipped() {
        let query = Coordinate::new(13.0, 80.2);
        let bad = Coordinate::new(f64::NAN, 80.2);
        let good = Coordinate::new(13.1, 80.2);
        assert_eq!(resolve_nearest(query, &[bad, good]).expect("nearest"), good);
        assert!(resolve_nearest(query, &[bad]).is_err());
    }

    #[test]
    fn assign_names_the_empty_kind() {
        let roster = FacilityRoster {
            ambulances: AMBULANCES.to_vec(),
            hospitals: Vec::new(),
        };
        match assign(Coordinate::new(13.0, 80.2), &roster) {
            Err(DispatchError::InvalidInput(msg)) => assert!(msg.starts_with("hospital")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
