use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::{blocking::Client, Url};
use tracing::{debug, warn};

use crate::config::OsrmConfig;
use crate::error::DispatchError;
use crate::geo::Coordinate;
use crate::routing::{Route, RouteProvider, RoutingError};

use super::parser::parse_route_body;

/// Routes via an OSRM HTTP endpoint.
#[derive(Debug)]
pub struct OsrmRouteProvider {
    client: Client,
    endpoint: String,
    config: OsrmConfig,
    last_request: Mutex<Option<Instant>>,
}

impl OsrmRouteProvider {
    /// Create a provider for `config.endpoint` (e.g. `http://localhost:5000`).
    pub fn new(config: OsrmConfig) -> Result<Self, DispatchError> {
        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|err| {
            DispatchError::Config(format!("invalid OSRM endpoint '{}': {}", endpoint, err))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| DispatchError::Config(format!("failed to build OSRM client: {}", err)))?;

        Ok(Self {
            client,
            endpoint,
            config,
            last_request: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the `/route` URL. OSRM expects `lng,lat` pairs in the path.
    pub fn route_url(&self, start: Coordinate, end: Coordinate) -> Result<Url, RoutingError> {
        let base = format!(
            "{}/route/v1/{}/{};{}",
            self.endpoint,
            self.config.profile,
            start.to_lng_lat_string(),
            end.to_lng_lat_string(),
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RoutingError::Network(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "polyline");
        Ok(url)
    }

    fn fetch_once(&self, url: &Url) -> Result<Route, RoutingError> {
        self.throttle();
        debug!(%url, "requesting OSRM route");

        let response = self.client.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        parse_route_body(status, &body)
    }

    /// Linear backoff before retry number `attempt`, saturating instead of overflowing.
    pub(super) fn retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(
            self.config
                .retry_backoff_ms
                .saturating_mul(u64::from(attempt)),
        )
    }

    /// Sleep until `min_request_interval_ms` has passed since the previous request.
    fn throttle(&self) {
        let interval = Duration::from_millis(self.config.min_request_interval_ms);
        if interval.is_zero() {
            return;
        }
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl RouteProvider for OsrmRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        let url = self.route_url(start, end)?;
        let mut attempt: u32 = 0;

        loop {
            match self.fetch_once(&url) {
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let backoff = self.retry_backoff(attempt);
                    warn!(attempt, error = %err, ?backoff, "OSRM request failed, retrying");
                    thread::sleep(backoff);
                }
                result => return result,
            }
        }
    }
}
