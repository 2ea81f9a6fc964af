//! OSRM `/route` client.
//!
//! This module wraps a blocking HTTP client for OSRM, decodes the compact
//! polyline geometry, and maps every failure onto [`RoutingError`] so the
//! presentation layer can tell "request failed" apart from "no path exists".

mod client;
mod parser;
mod response;


pub use client::OsrmRouteProvider;
