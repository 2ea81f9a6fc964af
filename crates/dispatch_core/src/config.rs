//! Dispatch configuration: region, facility roster, and routing backend settings.
//!
//! All structs use `#[serde(default)]` so a JSON file only needs the fields it
//! overrides. Defaults reproduce the built-in Chennai demo against the public
//! OSRM server.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::facilities::{FacilityKind, FacilityRoster};
use crate::incident::BoundingBox;
use crate::routing::{RouteProviderKind, DEFAULT_ESTIMATE_SPEED_KMH};

/// Public OSRM demo server.
pub const DEFAULT_OSRM_ENDPOINT: &str = "http://router.project-osrm.org";
const DEFAULT_OSRM_PROFILE: &str = "driving";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
/// The demo server's usage policy allows at most one request per second.
const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 1_000;
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;

/// OSRM HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    /// Base URL, e.g. `http://localhost:5000`.
    pub endpoint: String,
    /// OSRM profile segment of the URL (`driving`, `car`, ...).
    pub profile: String,
    /// Per-request timeout covering connect and body read.
    pub timeout_ms: u64,
    /// Extra attempts after a transient failure (network, 429, 5xx).
    pub max_retries: u32,
    /// Linear backoff step between attempts.
    pub retry_backoff_ms: u64,
    /// Minimum spacing between consecutive requests. 0 disables throttling.
    pub min_request_interval_ms: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OSRM_ENDPOINT.to_string(),
            profile: DEFAULT_OSRM_PROFILE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
        }
    }
}

impl OsrmConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    pub fn with_min_request_interval_ms(mut self, interval_ms: u64) -> Self {
        self.min_request_interval_ms = interval_ms;
        self
    }
}

/// Routing backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub provider: RouteProviderKind,
    pub osrm: OsrmConfig,
    /// Speed assumed by the geodesic estimate, km/h.
    pub estimate_speed_kmh: f64,
    /// Number of routes kept by the LRU cache in front of OSRM.
    pub cache_capacity: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider: RouteProviderKind::default(),
            osrm: OsrmConfig::default(),
            estimate_speed_kmh: DEFAULT_ESTIMATE_SPEED_KMH,
            cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
        }
    }
}

/// Top-level configuration for a dispatch session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Region incidents are drawn from.
    pub region: BoundingBox,
    pub roster: FacilityRoster,
    pub routing: RoutingConfig,
    /// Seed for incident generation. `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl DispatchConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &Path) -> Result<Self, DispatchError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            DispatchError::Config(format!("failed to read {}: {}", path.display(), err))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DispatchError> {
        let config: DispatchConfig = serde_json::from_str(raw)
            .map_err(|err| DispatchError::Config(format!("invalid config JSON: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_region(mut self, region: BoundingBox) -> Self {
        self.region = region;
        self
    }

    pub fn with_roster(mut self, roster: FacilityRoster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_route_provider(mut self, provider: RouteProviderKind) -> Self {
        self.routing.provider = provider;
        self
    }

    pub fn with_osrm(mut self, osrm: OsrmConfig) -> Self {
        self.routing.osrm = osrm;
        self
    }

    /// Reject settings that would make generation or routing meaningless.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if !self.region.is_valid() {
            return Err(DispatchError::Config(format!(
                "region bounds are inverted or not finite: {:?}",
                self.region
            )));
        }
        for kind in [FacilityKind::Ambulance, FacilityKind::Hospital] {
            if self.roster.candidates(kind).is_empty() {
                return Err(DispatchError::Config(format!("roster has no {} entries", kind)));
            }
        }
        if self.routing.cache_capacity == 0 {
            return Err(DispatchError::Config(
                "routing.cache_capacity must be > 0".to_string(),
            ));
        }
        if self.routing.provider == RouteProviderKind::Osrm {
            if self.routing.osrm.endpoint.trim().is_empty() {
                return Err(DispatchError::Config("routing.osrm.endpoint is empty".to_string()));
            }
            if self.routing.osrm.timeout_ms == 0 {
                return Err(DispatchError::Config(
                    "routing.osrm.timeout_ms must be > 0".to_string(),
                ));
            }
            if self.routing.osrm.retry_backoff_ms > self.routing.osrm.timeout_ms {
                return Err(DispatchError::Config(format!(
                    "routing.osrm.retry_backoff_ms ({}) must not exceed timeout_ms ({})",
                    self.routing.osrm.retry_backoff_ms, self.routing.osrm.timeout_ms
                )));
            }
        }
        if !(self.routing.estimate_speed_kmh.is_finite() && self.routing.estimate_speed_kmh > 0.0)
        {
            return Err(DispatchError::Config(
                "routing.estimate_speed_kmh must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn defaults_are_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.routing.osrm.endpoint, DEFAULT_OSRM_ENDPOINT);
        assert_eq!(config.region, BoundingBox::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DispatchConfig::from_json(
            r#"{ "seed": 9, "routing": { "provider": "geodesic", "osrm": { "timeout_ms": 500 } } }"#,
        )
        .expect("config");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.routing.provider, RouteProviderKind::Geodesic);
        assert_eq!(config.routing.osrm.timeout_ms, 500);
        assert_eq!(config.routing.osrm.profile, "driving");
        assert_eq!(config.roster, FacilityRoster::default());
    }

    #[test]
    fn custom_roster_round_trips_through_json() {
        let config = DispatchConfig::default().with_roster(FacilityRoster {
            ambulances: vec![Coordinate::new(1.0, 2.0)],
            hospitals: vec![Coordinate::new(3.0, 4.0)],
        });
        let raw = serde_json::to_string(&config).expect("serialize");
        assert_eq!(DispatchConfig::from_json(&raw).expect("parse"), config);
    }

    #[test]
    fn empty_roster_is_rejected() {
        let config = DispatchConfig::default().with_roster(FacilityRoster {
            ambulances: Vec::new(),
            hospitals: vec![Coordinate::new(3.0, 4.0)],
        });
        assert!(matches!(config.validate(), Err(DispatchError::Config(_))));
    }

    #[test]
    fn inverted_region_is_rejected() {
        let err = DispatchConfig::from_json(
            r#"{ "region": { "lat_min": 13.2, "lat_max": 12.9, "lng_min": 80.1, "lng_max": 80.3 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
    }

    #[test]
    fn retry_backoff_longer_than_timeout_is_rejected() {
        let config = DispatchConfig::default().with_osrm(
            OsrmConfig::default()
                .with_timeout_ms(1_000)
                .with_retry_backoff_ms(u64::MAX),
        );
        assert!(matches!(config.validate(), Err(DispatchError::Config(_))));

        let at_limit = DispatchConfig::default().with_osrm(
            OsrmConfig::default()
                .with_timeout_ms(1_000)
                .with_retry_backoff_ms(1_000),
        );
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        assert!(matches!(
            DispatchConfig::from_json("{ not json"),
            Err(DispatchError::Config(_))
        ));
    }
}
