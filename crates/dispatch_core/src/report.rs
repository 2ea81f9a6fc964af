//! Human- and machine-readable summaries of a dispatch run.

use std::fmt;

use serde::Serialize;

use crate::geo::Coordinate;
use crate::nearest::Assignment;
use crate::routing::Route;
use crate::session::{DispatchSession, RoutePlan};

/// Distance/time summary of one route leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSummary {
    pub label: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub path_points: usize,
}

impl LegSummary {
    pub fn from_route(label: impl Into<String>, route: &Route) -> Self {
        Self {
            label: label.into(),
            distance_km: route.distance_km,
            duration_min: route.duration_min,
            path_points: route.path.len(),
        }
    }
}

impl fmt::Display for LegSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} km, {:.1} mins",
            self.label, self.distance_km, self.duration_min
        )
    }
}

/// Snapshot of a session for printing or JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub incident: Option<Coordinate>,
    pub assignment: Option<Assignment>,
    pub legs: Vec<LegSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<RoutePlan>,
}

impl DispatchReport {
    /// Build a report. Paths are included only when `include_paths` is set.
    pub fn from_session(session: &DispatchSession, include_paths: bool) -> Self {
        let legs = session
            .plan()
            .map(|plan| {
                vec![
                    LegSummary::from_route("Ambulance → Accident", &plan.to_incident),
                    LegSummary::from_route("Accident → Hospital", &plan.to_hospital),
                ]
            })
            .unwrap_or_default();

        Self {
            incident: session.incident(),
            assignment: session.assignment(),
            legs,
            paths: if include_paths {
                session.plan().cloned()
            } else {
                None
            },
        }
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.incident {
            Some(incident) => writeln!(f, "Accident location: {}", incident)?,
            None => writeln!(f, "Accident location: not detected")?,
        }
        match self.assignment {
            Some(assignment) => {
                writeln!(f, "Ambulance: {}", assignment.ambulance)?;
                writeln!(f, "Hospital:  {}", assignment.hospital)?;
            }
            None => writeln!(f, "Ambulance: not assigned")?,
        }
        if self.legs.is_empty() {
            writeln!(f, "Routes: not planned")?;
        }
        for leg in &self.legs {
            writeln!(f, "{}", leg)?;
        }
        Ok(())
    }
}
