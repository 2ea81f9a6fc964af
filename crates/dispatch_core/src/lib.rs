//! Core of the emergency dispatch simulation.
//!
//! Three stateless entry points drive a dispatch run:
//!
//! - [`generate_incident`]: random accident location inside the demo region.
//! - [`resolve_nearest`]: closest facility by ellipsoidal geodesic distance.
//! - [`fetch_route`]: road route and ETA from a [`routing::RouteProvider`].
//!
//! [`session::DispatchSession`] carries results between user actions.

pub mod config;
pub mod error;
pub mod facilities;
pub mod geo;
pub mod incident;
pub mod nearest;
pub mod polyline;
pub mod report;
pub mod routing;
pub mod session;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::DispatchError;
pub use geo::Coordinate;
pub use incident::generate_incident;
pub use nearest::resolve_nearest;
pub use routing::fetch_route;
