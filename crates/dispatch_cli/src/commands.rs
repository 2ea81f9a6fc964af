use std::error::Error;
use std::io::{self, Write};

use dispatch_core::config::DispatchConfig;
use dispatch_core::facilities::FacilityKind;
use dispatch_core::geo::Coordinate;
use dispatch_core::nearest::resolve_nearest_index;
use dispatch_core::report::{DispatchReport, LegSummary};
use dispatch_core::routing::{build_route_provider, RouteProviderKind};
use dispatch_core::session::DispatchSession;
use dispatch_core::{fetch_route, DispatchError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::interactive;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Dispatch a parsed command line, writing results to `out`.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> CliResult {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Simulate { seed, json, paths } => simulate(&config, seed, json, paths, out),
        Commands::Detect { seed } => {
            let mut session = DispatchSession::new();
            let incident = session.detect_accident(&mut seeded_rng(seed, &config), &config.region);
            writeln!(out, "Accident detected at {}", incident)?;
            Ok(())
        }
        Commands::Nearest { lat, lng, kind } => nearest(&config, Coordinate::new(lat, lng), kind, out),
        Commands::Route { from, to, json } => route(&config, from, to, json, out),
        Commands::Interactive { seed } => {
            let provider = build_route_provider(&config.routing)?;
            let stdin = io::stdin();
            interactive::run(
                stdin.lock(),
                out,
                &config,
                provider.as_ref(),
                &mut seeded_rng(seed, &config),
            )?;
            Ok(())
        }
    }
}

/// Config file (if any) with command-line overrides applied, validated.
pub fn load_config(cli: &Cli) -> Result<DispatchConfig, DispatchError> {
    let mut config = match &cli.config {
        Some(path) => DispatchConfig::from_file(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.routing.osrm.endpoint = endpoint.clone();
    }
    if cli.offline {
        config.routing.provider = RouteProviderKind::Geodesic;
    }
    config.validate()?;
    Ok(config)
}

fn seeded_rng(seed: Option<u64>, config: &DispatchConfig) -> StdRng {
    match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn simulate<W: Write>(
    config: &DispatchConfig,
    seed: Option<u64>,
    json: bool,
    paths: bool,
    out: &mut W,
) -> CliResult {
    let provider = build_route_provider(&config.routing)?;
    let mut rng = seeded_rng(seed, config);
    let mut session = DispatchSession::new();

    session.detect_accident(&mut rng, &config.region);
    session.check_availability(&config.roster)?;
    session.plan_routes(provider.as_ref())?;

    let report = DispatchReport::from_session(&session, paths);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(out, "{}", report)?;
    }
    Ok(())
}

fn nearest<W: Write>(
    config: &DispatchConfig,
    query: Coordinate,
    kind: FacilityKind,
    out: &mut W,
) -> CliResult {
    let candidates = config.roster.candidates(kind);
    let (idx, distance_km) = resolve_nearest_index(query, candidates)?;
    info!(%query, %kind, idx, "nearest facility resolved");
    writeln!(
        out,
        "Nearest {} #{} at {} ({:.2} km)",
        kind,
        idx + 1,
        candidates[idx],
        distance_km
    )?;
    Ok(())
}

fn route<W: Write>(
    config: &DispatchConfig,
    from: Coordinate,
    to: Coordinate,
    json: bool,
    out: &mut W,
) -> CliResult {
    let provider = build_route_provider(&config.routing)?;
    let route = fetch_route(provider.as_ref(), from, to)?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&route)?)?;
    } else {
        writeln!(out, "{}", LegSummary::from_route(format!("{} → {}", from, to), &route))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use dispatch_core::test_helpers::{osrm_body, StubOsrmServer, FIXTURE_POLYLINE};

    fn run_args(args: &[&str]) -> (CliResult, String) {
        let cli = Cli::try_parse_from(args).expect("parse");
        let mut out = Vec::new();
        let result = run(cli, &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn nearest_prints_closest_hospital() {
        let (result, text) = run_args(&[
            "dispatch", "nearest", "--lat", "13.0", "--lng", "80.2", "--kind", "hospital",
        ]);
        assert!(result.is_ok());
        assert!(text.starts_with("Nearest hospital #2 at (12.9800, 80.2100)"), "{text}");
    }

    #[test]
    fn offline_simulation_is_reproducible_with_seed() {
        let args = ["dispatch", "--offline", "simulate", "--seed", "42"];
        let (first, a) = run_args(&args);
        let (second, b) = run_args(&args);
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(a, b);
        assert!(a.contains("Accident → Hospital:"));
    }

    #[test]
    fn offline_json_report_includes_paths_on_request() {
        let (result, text) = run_args(&[
            "dispatch", "--offline", "simulate", "--seed", "1", "--json", "--paths",
        ]);
        assert!(result.is_ok());
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["legs"].as_array().map(|legs| legs.len()), Some(2));
        assert!(value["paths"]["to_incident"]["path"].is_array());
    }

    #[test]
    fn route_uses_configured_endpoint() {
        let server = StubOsrmServer::start(vec![(200, osrm_body(5000.0, 600.0, FIXTURE_POLYLINE))])
            .expect("stub server");
        let endpoint = server.endpoint().to_string();
        let (result, text) = run_args(&[
            "dispatch", "--endpoint", &endpoint, "route", "--from", "12.9716,80.2210", "--to",
            "13.0,80.2",
        ]);
        assert!(result.is_ok(), "{result:?}");
        assert_eq!(
            text.trim(),
            "(12.9716, 80.2210) → (13.0000, 80.2000): 5.00 km, 10.0 mins"
        );
        assert_eq!(server.join().len(), 1);
    }

    #[test]
    fn route_failure_is_returned_not_swallowed() {
        let server = StubOsrmServer::start(vec![(200, r#"{"code":"Ok","routes":[]}"#.to_string())])
            .expect("stub server");
        let endpoint = server.endpoint().to_string();
        let (result, text) = run_args(&[
            "dispatch", "--endpoint", &endpoint, "route", "--from", "12.9716,80.2210", "--to",
            "13.0,80.2",
        ]);
        let err = result.expect_err("empty routes must fail");
        assert!(err.to_string().contains("no route found"), "{err}");
        assert!(text.is_empty());
        server.join();
    }

    #[test]
    fn bad_endpoint_is_a_config_error() {
        let (result, _) = run_args(&[
            "dispatch", "--endpoint", "", "route", "--from", "13.0,80.2", "--to", "13.1,80.3",
        ]);
        assert!(result.is_err());
    }
}
