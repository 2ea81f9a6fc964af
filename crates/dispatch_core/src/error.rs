use std::fmt;

use crate::routing::RoutingError;

/// Errors surfaced by the dispatch entry points and session handlers.
#[derive(Debug)]
pub enum DispatchError {
    /// A caller-supplied argument cannot be used (e.g. an empty candidate set).
    InvalidInput(String),
    /// Route retrieval failed.
    Routing(RoutingError),
    /// An assignment was requested before any incident was detected.
    MissingIncident,
    /// Routes were requested before facilities were assigned.
    MissingAssignment,
    /// Configuration could not be loaded or failed validation.
    Config(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            DispatchError::Routing(err) => write!(f, "routing failed: {}", err),
            DispatchError::MissingIncident => write!(f, "no incident has been detected yet"),
            DispatchError::MissingAssignment => {
                write!(f, "no ambulance/hospital has been assigned yet")
            }
            DispatchError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Routing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RoutingError> for DispatchError {
    fn from(err: RoutingError) -> Self {
        DispatchError::Routing(err)
    }
}
