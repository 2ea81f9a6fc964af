//! Explicit per-user dispatch context.
//!
//! The presentation layer owns a [`DispatchSession`] and invokes one handler
//! per user action. Each handler checks that its inputs already exist and
//! invalidates everything derived from the value it replaces.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::error::DispatchError;
use crate::facilities::FacilityRoster;
use crate::geo::Coordinate;
use crate::incident::{generate_incident_in, BoundingBox};
use crate::nearest::{assign, Assignment};
use crate::routing::{fetch_route, Route, RouteProvider};

/// Both legs of an emergency run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    /// Ambulance → accident.
    pub to_incident: Route,
    /// Accident → hospital.
    pub to_hospital: Route,
}

impl RoutePlan {
    pub fn total_distance_km(&self) -> f64 {
        self.to_incident.distance_km + self.to_hospital.distance_km
    }

    pub fn total_duration_min(&self) -> f64 {
        self.to_incident.duration_min + self.to_hospital.duration_min
    }
}

/// Values retained across interactions within one user session.
#[derive(Debug, Clone, Default)]
pub struct DispatchSession {
    incident: Option<Coordinate>,
    assignment: Option<Assignment>,
    plan: Option<RoutePlan>,
}

impl DispatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incident(&self) -> Option<Coordinate> {
        self.incident
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    pub fn plan(&self) -> Option<&RoutePlan> {
        self.plan.as_ref()
    }

    /// "Detect accident": replace the incident and drop everything derived from it.
    pub fn detect_accident<R: Rng + ?Sized>(&mut self, rng: &mut R, region: &BoundingBox) -> Coordinate {
        let incident = generate_incident_in(rng, region);
        self.record_incident(incident);
        incident
    }

    /// Use a known incident location instead of generating one.
    pub fn record_incident(&mut self, incident: Coordinate) {
        self.incident = Some(incident);
        self.assignment = None;
        self.plan = None;
        info!(%incident, "accident detected");
    }

    /// "Check ambulance availability": assign nearest ambulance and hospital.
    pub fn check_availability(&mut self, roster: &FacilityRoster) -> Result<Assignment, DispatchError> {
        let incident = self.incident.ok_or(DispatchError::MissingIncident)?;
        let assignment = assign(incident, roster)?;
        self.assignment = Some(assignment);
        self.plan = None;
        info!(
            ambulance = %assignment.ambulance,
            hospital = %assignment.hospital,
            "nearest ambulance assigned"
        );
        Ok(assignment)
    }

    /// Fetch ambulance → accident and accident → hospital routes.
    ///
    /// On failure the previous plan is cleared; a partial plan is never stored.
    pub fn plan_routes(&mut self, provider: &dyn RouteProvider) -> Result<&RoutePlan, DispatchError> {
        let incident = self.incident.ok_or(DispatchError::MissingIncident)?;
        let assignment = self.assignment.ok_or(DispatchError::MissingAssignment)?;
        self.plan = None;

        let to_incident = fetch_route(provider, assignment.ambulance, incident)?;
        let to_hospital = fetch_route(provider, incident, assignment.hospital)?;
        info!(
            eta_min = to_incident.duration_min,
            transfer_min = to_hospital.duration_min,
            "routes planned"
        );

        Ok(self.plan.insert(RoutePlan {
            to_incident,
            to_hospital,
        }))
    }
}
