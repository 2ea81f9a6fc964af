//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`OsrmRouteProvider`**: Calls an OSRM HTTP endpoint and decodes the polyline geometry.
//! - **`GeodesicRouteProvider`**: Offline straight-line estimate. Zero network access.
//!
//! The OSRM provider is wrapped in a [`CachedRouteProvider`] by [`build_route_provider`].
//! Failures are always returned to the caller; no provider substitutes a default route.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RoutingConfig;
use crate::error::DispatchError;
use crate::geo::Coordinate;

mod error;
pub mod osrm;

pub use error::RoutingError;
pub use osrm::OsrmRouteProvider;

/// Average urban driving speed assumed by the geodesic estimate.
pub const DEFAULT_ESTIMATE_SPEED_KMH: f64 = 40.0;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// A drivable path between two points with its length and travel time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Lat/lng points along the road, start to end.
    pub path: Vec<Coordinate>,
    /// Road-network distance in kilometres.
    pub distance_km: f64,
    /// Travel time in minutes.
    pub duration_min: f64,
}

/// Which routing backend to use.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteProviderKind {
    /// OSRM HTTP endpoint configured by [`crate::config::OsrmConfig`].
    #[default]
    Osrm,
    /// Straight-line geodesic estimate, no external dependencies.
    Geodesic,
}

/// Trait for routing backends. Implementations must be `Send + Sync` so a
/// single provider can be shared by the presentation layer.
pub trait RouteProvider: Send + Sync {
    /// Compute a route from `start` to `end`.
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError>;
}

impl<P: RouteProvider + ?Sized> RouteProvider for Box<P> {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        (**self).route(start, end)
    }
}

/// Fetch a route between two known coordinates.
pub fn fetch_route(
    provider: &dyn RouteProvider,
    start: Coordinate,
    end: Coordinate,
) -> Result<Route, DispatchError> {
    for (label, point) in [("start", start), ("end", end)] {
        if !point.lat.is_finite() || !point.lng.is_finite() {
            return Err(DispatchError::InvalidInput(format!(
                "{} coordinate is not finite: {:?}",
                label, point
            )));
        }
    }

    let route = provider.route(start, end)?;
    debug!(
        %start,
        %end,
        points = route.path.len(),
        distance_km = route.distance_km,
        duration_min = route.duration_min,
        "route fetched"
    );
    Ok(route)
}

// ---------------------------------------------------------------------------
// Geodesic estimate (always available)
// ---------------------------------------------------------------------------

/// Two-point route at geodesic distance and a fixed average speed.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicRouteProvider {
    speed_kmh: f64,
}

impl GeodesicRouteProvider {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl Default for GeodesicRouteProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ESTIMATE_SPEED_KMH)
    }
}

impl RouteProvider for GeodesicRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        let distance_km = start.geodesic_distance_km(&end);
        let duration_min = if distance_km > 0.0 && self.speed_kmh > 0.0 {
            distance_km / self.speed_kmh * 60.0
        } else {
            0.0
        };
        Ok(Route {
            path: vec![start, end],
            distance_km,
            duration_min,
        })
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

type RouteKey = ((u64, u64), (u64, u64));

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the bit pattern of `(start, end)` (directional).
/// Only successful routes are stored; errors reach the caller unchanged.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<RouteKey, Route>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        let key = (start.bits(), end.bits());

        // Fast path: cache hit
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                debug!(%start, %end, "route cache hit");
                return Ok(cached.clone());
            }
        }

        let route = self.inner.route(start, end)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }

        Ok(route)
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RoutingConfig
// ---------------------------------------------------------------------------

/// Construct a boxed [`RouteProvider`] from the routing configuration.
///
/// - `Geodesic` is returned without caching (it's already cheap).
/// - `Osrm` is wrapped in a [`CachedRouteProvider`] sized by `cache_capacity`.
pub fn build_route_provider(config: &RoutingConfig) -> Result<Box<dyn RouteProvider>, DispatchError> {
    match config.provider {
        RouteProviderKind::Geodesic => Ok(Box::new(GeodesicRouteProvider::new(
            config.estimate_speed_kmh,
        ))),
        RouteProviderKind::Osrm => {
            let inner = Box::new(OsrmRouteProvider::new(config.osrm.clone())?);
            Ok(Box::new(CachedRouteProvider::new(
                inner,
                config.cache_capacity,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RouteProvider for CountingProvider {
        fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RoutingError::NoRouteFound("stub".to_string()));
            }
            GeodesicRouteProvider::default().route(start, end)
        }
    }

    fn counting(fail: bool) -> (CachedRouteProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = CountingProvider {
            calls: Arc::clone(&calls),
            fail,
        };
        (CachedRouteProvider::new(Box::new(inner), 8), calls)
    }

    #[test]
    fn geodesic_estimate_uses_average_speed() {
        let start = Coordinate::new(13.0, 80.2);
        let end = Coordinate::new(13.1, 80.2);
        let route = GeodesicRouteProvider::new(60.0).route(start, end).expect("route");
        assert_eq!(route.path, vec![start, end]);
        assert!((route.duration_min - route.distance_km).abs() < 1e-9);
    }

    #[test]
    fn geodesic_estimate_same_point_is_zero() {
        let p = Coordinate::new(13.0, 80.2);
        let route = GeodesicRouteProvider::default().route(p, p).expect("route");
        assert_eq!(route.distance_km, 0.0);
        assert_eq!(route.duration_min, 0.0);
    }

    #[test]
    fn cache_serves_repeat_requests() {
        let (provider, calls) = counting(false);
        let a = Coordinate::new(13.0, 80.2);
        let b = Coordinate::new(13.05, 80.25);
        let first = provider.route(a, b).expect("route");
        let second = provider.route(a, b).expect("route");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn cache_is_directional() {
        let (provider, calls) = counting(false);
        let a = Coordinate::new(13.0, 80.2);
        let b = Coordinate::new(13.05, 80.25);
        provider.route(a, b).expect("route");
        provider.route(b, a).expect("route");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let (provider, calls) = counting(true);
        let a = Coordinate::new(13.0, 80.2);
        let b = Coordinate::new(13.05, 80.25);
        assert!(provider.route(a, b).is_err());
        assert!(provider.route(a, b).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(provider.is_empty());
    }

    #[test]
    fn fetch_route_rejects_non_finite_endpoints() {
        let provider = GeodesicRouteProvider::default();
        let err = fetch_route(
            &provider,
            Coordinate::new(f64::NAN, 80.2),
            Coordinate::new(13.0, 80.2),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidInput(_)));
    }

    #[test]
    fn route_provider_kind_default_is_osrm() {
        assert_eq!(RouteProviderKind::default(), RouteProviderKind::Osrm);
    }
}
