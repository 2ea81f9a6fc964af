use std::fmt;

use crate::polyline::PolylineError;

/// Errors encountered while retrieving a route.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// Transport-level failure: connection refused, DNS, timeout.
    Network(String),
    /// The routing service answered with a non-success status, a non-`Ok`
    /// code, or a body that is not OSRM JSON. `body` keeps at most the first
    /// 512 characters, with `...` appended when cut.
    Service { status: u16, body: String },
    /// The service was reachable but returned no usable route: no path
    /// between the endpoints, or a route lacking distance, duration or geometry.
    NoRouteFound(String),
    /// Route geometry could not be decoded.
    Decode(PolylineError),
}

impl RoutingError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RoutingError::Network(_) => true,
            RoutingError::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Network(msg) => write!(f, "network error: {}", msg),
            RoutingError::Service { status, body } => {
                write!(f, "routing service returned HTTP {}: {}", status, body)
            }
            RoutingError::NoRouteFound(detail) => write!(f, "no route found: {}", detail),
            RoutingError::Decode(err) => write!(f, "undecodable route geometry: {}", err),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PolylineError> for RoutingError {
    fn from(err: PolylineError) -> Self {
        RoutingError::Decode(err)
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RoutingError::Network(format!("request timed out: {}", err))
        } else {
            RoutingError::Network(err.to_string())
        }
    }
}
