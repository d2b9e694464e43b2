//! Free-text coordinate parsing.

use std::sync::OnceLock;

use regex::Regex;

use super::types::{CoordError, Coordinate};

/// Accepted layouts, tried in order.
fn patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // "35.68, 139.76"
            Regex::new(r"^(-?\d+\.?\d*)\s*,\s*(-?\d+\.?\d*)$").unwrap(),
            // "35.68 139.76"
            Regex::new(r"^(-?\d+\.?\d*)\s+(-?\d+\.?\d*)$").unwrap(),
            // "35 139"
            Regex::new(r"^(-?\d{1,2})\s+(-?\d{2,3})$").unwrap(),
        ]
    })
}

/// Parses `lat,lon`, `lat lon` or compact integer `DD DDD` text.
///
/// The first layout that matches and lies within the latitude/longitude
/// ranges wins. A matching but out-of-range pair reports the range error.
pub fn parse_coordinates(text: &str) -> Result<Coordinate, CoordError> {
    let trimmed = text.trim();
    let mut range_error = None;

    for pattern in patterns() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            continue;
        };
        match Coordinate::new(lat, lon) {
            Ok(coord) => return Ok(coord),
            Err(e) => range_error = Some(e),
        }
    }

    Err(range_error.unwrap_or_else(|| CoordError::Unparsable(text.to_string())))
}
