//! Compact polyline codec (Google encoded polyline algorithm format).
//!
//! Each coordinate is stored as a delta from the previous one, scaled by
//! `10^precision`, zig-zag encoded and split into 5-bit chunks offset by 63.
//! OSRM emits precision 5 for `geometries=polyline`.

use std::fmt;

use crate::geo::Coordinate;

/// Precision used by OSRM `geometries=polyline` and most web map clients.
pub const DEFAULT_PRECISION: u32 = 5;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION_BIT: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;
/// Beyond this shift a single value no longer fits the accumulator.
const MAX_SHIFT: u32 = 60;

/// Reasons an encoded path cannot be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum PolylineError {
    /// Byte outside the `'?'..='~'` alphabet at the given offset.
    InvalidCharacter { position: usize, byte: u8 },
    /// Input ended mid-value or after a latitude without its longitude.
    UnexpectedEnd { position: usize },
    /// A single value spans too many chunks.
    Overflow { position: usize },
    /// Decoded point falls outside valid latitude/longitude ranges.
    OutOfRange { index: usize, lat: f64, lng: f64 },
}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolylineError::InvalidCharacter { position, byte } => {
                write!(f, "invalid byte 0x{:02x} at offset {}", byte, position)
            }
            PolylineError::UnexpectedEnd { position } => {
                write!(f, "unexpected end of polyline at offset {}", position)
            }
            PolylineError::Overflow { position } => {
                write!(f, "value overflow at offset {}", position)
            }
            PolylineError::OutOfRange { index, lat, lng } => {
                write!(f, "point {} out of range: ({}, {})", index, lat, lng)
            }
        }
    }
}

impl std::error::Error for PolylineError {}

/// Decode an encoded polyline into (lat, lng) coordinates.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut cursor = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;
    let mut path = Vec::with_capacity(bytes.len() / 4);

    while cursor < bytes.len() {
        lat += next_value(bytes, &mut cursor)?;
        if cursor >= bytes.len() {
            return Err(PolylineError::UnexpectedEnd { position: cursor });
        }
        lng += next_value(bytes, &mut cursor)?;

        let point = Coordinate::new(lat as f64 / factor, lng as f64 / factor);
        if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lng) {
            return Err(PolylineError::OutOfRange {
                index: path.len(),
                lat: point.lat,
                lng: point.lng,
            });
        }
        path.push(point);
    }

    Ok(path)
}

/// Encode coordinates as a polyline string.
pub fn encode(path: &[Coordinate], precision: u32) -> String {
    let factor = 10_f64.powi(precision as i32);
    let mut out = String::with_capacity(path.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in path {
        let lat = (point.lat * factor).round() as i64;
        let lng = (point.lng * factor).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn next_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(PolylineError::UnexpectedEnd { position: *cursor });
        };
        let chunk = byte as i64 - ASCII_OFFSET;
        if !(0..=63).contains(&chunk) {
            return Err(PolylineError::InvalidCharacter {
                position: *cursor,
                byte,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { position: *cursor });
        }
        *cursor += 1;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(out: &mut String, delta: i64) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION_BIT {
        out.push(((CONTINUATION_BIT | (value & CHUNK_MASK)) + ASCII_OFFSET) as u8 as char);
        value >>= CHUNK_BITS;
    }
    out.push((value + ASCII_OFFSET) as u8 as char);
}
