//! Fixed simulated facility locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Simulated ambulance stand-by positions.
pub const AMBULANCES: [Coordinate; 3] = [
    Coordinate::new(12.9716, 80.2210),
    Coordinate::new(13.0500, 80.2500),
    Coordinate::new(12.9900, 80.1800),
];

/// Simulated hospital locations.
pub const HOSPITALS: [Coordinate; 3] = [
    Coordinate::new(13.0600, 80.2400),
    Coordinate::new(12.9800, 80.2100),
    Coordinate::new(13.0200, 80.3000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Ambulance,
    Hospital,
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityKind::Ambulance => write!(f, "ambulance"),
            FacilityKind::Hospital => write!(f, "hospital"),
        }
    }
}

impl FromStr for FacilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ambulance" | "ambulances" => Ok(FacilityKind::Ambulance),
            "hospital" | "hospitals" => Ok(FacilityKind::Hospital),
            other => Err(format!("unknown facility kind '{}'", other)),
        }
    }
}

/// Ordered candidate sets per facility kind. Order matters for tie-breaking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRoster {
    pub ambulances: Vec<Coordinate>,
    pub hospitals: Vec<Coordinate>,
}

impl Default for FacilityRoster {
    fn default() -> Self {
        Self {
            ambulances: AMBULANCES.to_vec(),
            hospitals: HOSPITALS.to_vec(),
        }
    }
}

impl FacilityRoster {
    pub fn candidates(&self, kind: FacilityKind) -> &[Coordinate] {
        match kind {
            FacilityKind::Ambulance => &self.ambulances,
            FacilityKind::Hospital => &self.hospitals,
        }
    }
}
