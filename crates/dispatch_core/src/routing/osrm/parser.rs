use crate::polyline::{self, DEFAULT_PRECISION};
use crate::routing::{Route, RoutingError};

use super::response::{OsrmRoute, OsrmRouteResponse};

const METRES_PER_KM: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;
/// Upper bound on how much of an error body is carried in [`RoutingError::Service`].
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 512;

/// Map an HTTP status and raw body onto a [`Route`] or a typed failure.
///
/// OSRM answers "no path" with HTTP 400 and `code: "NoRoute"`; that case is
/// reported as [`RoutingError::NoRouteFound`] before the status check. A
/// success status whose body is not OSRM JSON is a service fault.
pub(super) fn parse_route_body(status: u16, body: &str) -> Result<Route, RoutingError> {
    let parsed = serde_json::from_str::<OsrmRouteResponse>(body);

    if let Ok(resp) = &parsed {
        if resp.code.as_deref() == Some("NoRoute") {
            let detail = resp
                .message
                .clone()
                .unwrap_or_else(|| "NoRoute".to_string());
            return Err(RoutingError::NoRouteFound(detail));
        }
    }

    let success = (200..300).contains(&status);
    if !success {
        return Err(RoutingError::Service {
            status,
            body: truncate_body(body),
        });
    }

    let resp = parsed.map_err(|_| RoutingError::Service {
        status,
        body: truncate_body(body),
    })?;

    if let Some(code) = resp.code.as_deref() {
        if code != "Ok" {
            return Err(RoutingError::Service {
                status,
                body: truncate_body(body),
            });
        }
    }

    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or_else(|| RoutingError::NoRouteFound("response contained no routes".to_string()))?;

    route_from_osrm(route)
}

pub(super) fn route_from_osrm(route: OsrmRoute) -> Result<Route, RoutingError> {
    let distance_m = required_measure(route.distance, "distance")?;
    let duration_s = required_measure(route.duration, "duration")?;
    let geometry = route
        .geometry
        .ok_or_else(|| RoutingError::NoRouteFound("route is missing 'geometry'".to_string()))?;

    let path = polyline::decode(&geometry, DEFAULT_PRECISION)?;
    if path.is_empty() {
        return Err(RoutingError::NoRouteFound(
            "route geometry is empty".to_string(),
        ));
    }

    Ok(Route {
        path,
        distance_km: distance_m / METRES_PER_KM,
        duration_min: duration_s / SECONDS_PER_MINUTE,
    })
}

fn required_measure(value: Option<f64>, field: &str) -> Result<f64, RoutingError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(RoutingError::NoRouteFound(format!(
            "route '{}' is not a non-negative number: {}",
            field, v
        ))),
        None => Err(RoutingError::NoRouteFound(format!(
            "route is missing '{}'",
            field
        ))),
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut out: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        out.push_str("...");
        out
    }
}
