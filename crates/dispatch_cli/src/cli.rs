use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use dispatch_core::facilities::FacilityKind;
use dispatch_core::geo::Coordinate;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "dispatch",
    about = "Simulated accident detection and emergency dispatch",
    long_about = "Generates a simulated accident, assigns the nearest ambulance and hospital,\n\
                  and fetches road routes with ETAs from an OSRM routing service."
)]
pub struct Cli {
    /// JSON configuration file (region, roster, routing)
    #[arg(long, global = true, env = "DISPATCH_CONFIG")]
    pub config: Option<PathBuf>,
    /// Override the OSRM endpoint, e.g. http://localhost:5000
    #[arg(long, global = true, env = "DISPATCH_OSRM_ENDPOINT")]
    pub endpoint: Option<String>,
    /// Use the straight-line estimate instead of OSRM
    #[arg(long, global = true)]
    pub offline: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect an accident, assign facilities and plan both routes
    Simulate {
        /// Seed for the accident location
        #[arg(long)]
        seed: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Include decoded route paths in JSON output
        #[arg(long, requires = "json")]
        paths: bool,
    },
    /// Generate a simulated accident location
    Detect {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Resolve the nearest facility to a point
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// ambulance or hospital
        #[arg(long, default_value = "ambulance")]
        kind: FacilityKind,
    },
    /// Fetch a route between two points given as LAT,LNG
    Route {
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,
        #[arg(long)]
        json: bool,
    },
    /// Read events (detect, assign, route, status, quit) from stdin
    Interactive {
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Parse `"lat,lng"` into a [`Coordinate`].
pub fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{}'", raw))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|err| format!("invalid latitude '{}': {}", lat.trim(), err))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|err| format!("invalid longitude '{}': {}", lng.trim(), err))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate out of range: {},{}", lat, lng));
    }
    Ok(Coordinate::new(lat, lng))
}
