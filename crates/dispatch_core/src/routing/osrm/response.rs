//! Minimal OSRM JSON response structures.
//!
//! Every field is optional: the public server is third-party and unversioned,
//! so presence is checked in the parser instead of failing deserialization.

#[derive(serde::Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: Option<String>,
    pub(super) message: Option<String>,
    pub(super) routes: Option<Vec<OsrmRoute>>,
}

#[derive(serde::Deserialize)]
pub(super) struct OsrmRoute {
    pub(super) distance: Option<f64>, // metres
    pub(super) duration: Option<f64>, // seconds
    pub(super) geometry: Option<String>,
}
