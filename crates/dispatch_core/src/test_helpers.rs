//! Shared fixtures for unit and integration tests.
//!
//! Enabled by the default `test-helpers` feature.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::OsrmConfig;
use crate::geo::Coordinate;
use crate::routing::{Route, RouteProvider, RoutingError};

/// Published polyline test vector and its decoded points.
pub const FIXTURE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

pub fn fixture_path() -> Vec<Coordinate> {
    vec![
        Coordinate::new(38.5, -120.2),
        Coordinate::new(40.7, -120.95),
        Coordinate::new(43.252, -126.453),
    ]
}

/// OSRM-shaped success body with a single route.
pub fn osrm_body(distance_m: f64, duration_s: f64, geometry: &str) -> String {
    format!(
        r#"{{"code":"Ok","routes":[{{"distance":{},"duration":{},"geometry":"{}","legs":[]}}],"waypoints":[]}}"#,
        distance_m, duration_s, geometry
    )
}

/// OSRM config pointing at `endpoint` with throttling and retry delays disabled.
pub fn fast_osrm_config(endpoint: &str) -> OsrmConfig {
    OsrmConfig::default()
        .with_endpoint(endpoint)
        .with_timeout_ms(2_000)
        .with_retry_backoff_ms(0)
        .with_min_request_interval_ms(0)
}

/// Provider that returns the same outcome for every request.
pub struct StubRouteProvider {
    outcome: Result<Route, RoutingError>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl StubRouteProvider {
    pub fn ok(route: Route) -> Self {
        Self {
            outcome: Ok(route),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: RoutingError) -> Self {
        Self {
            outcome: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Endpoints seen so far, in call order.
    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl RouteProvider for StubRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Route, RoutingError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((start, end));
        }
        self.outcome.clone()
    }
}

/// How long [`StubOsrmServer`] waits for the next connection before giving up.
pub const STUB_ACCEPT_DEADLINE: Duration = Duration::from_secs(5);

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Minimal local HTTP server answering canned responses, one per connection.
///
/// Unused responses are dropped once no client connects within the accept
/// deadline, so [`StubOsrmServer::join`] always returns.
pub struct StubOsrmServer {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubOsrmServer {
    /// Bind to an ephemeral port and serve `responses` in order, then stop.
    pub fn start(responses: Vec<(u16, String)>) -> io::Result<Self> {
        Self::start_with_deadline(responses, STUB_ACCEPT_DEADLINE)
    }

    /// Like [`StubOsrmServer::start`], waiting at most `deadline` per connection.
    pub fn start_with_deadline(
        responses: Vec<(u16, String)>,
        deadline: Duration,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let endpoint = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let Some(stream) = accept_before(&listener, deadline) else {
                    return;
                };
                let Some(request_line) = read_request(&stream) else {
                    return;
                };
                if let Ok(mut seen) = seen.lock() {
                    seen.push(request_line);
                }
                write_response(stream, status, &body);
            }
        });

        Ok(Self {
            endpoint,
            requests,
            handle: Some(handle),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request lines received so far (e.g. `GET /route/v1/... HTTP/1.1`).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Wait for the server thread to serve all responses or hit its deadline.
    pub fn join(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.requests()
    }
}

fn accept_before(listener: &TcpListener, deadline: Duration) -> Option<TcpStream> {
    let started = Instant::now();
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).ok()?;
                stream.set_read_timeout(Some(deadline)).ok()?;
                return Some(stream);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                if started.elapsed() >= deadline {
                    return None;
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(_) => return None,
        }
    }
}

/// Read the request line and drain headers up to the blank line.
fn read_request(stream: &TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut header = String::new();
    while reader.read_line(&mut header).map(|n| n > 2).unwrap_or(false) {
        header.clear();
    }
    Some(request_line.trim_end().to_string())
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
    let _ = stream.shutdown(Shutdown::Write);
}
