//! Planar and spherical geometry helpers.

use geojson::Position;
use thiserror::Error;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Malformed geometry encountered while testing a feature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("position has {0} ordinates, expected at least 2")]
    ShortPosition(usize),
    #[error("polygon has no rings")]
    EmptyPolygon,
}

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Reads `[x, y]` from a position.
pub fn xy(position: &Position) -> Result<(f64, f64), GeometryError> {
    match position.as_slice() {
        [x, y, ..] => Ok((*x, *y)),
        other => Err(GeometryError::ShortPosition(other.len())),
    }
}

/// Crossing-number test of `(x, y)` against a single ring.
///
/// The ring may be open or closed. Points exactly on an edge may go
/// either way.
pub fn point_in_ring(x: f64, y: f64, ring: &[Position]) -> Result<bool, GeometryError> {
    let mut inside = false;
    if ring.is_empty() {
        return Ok(false);
    }

    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = xy(&ring[i])?;
        let (xj, yj) = xy(&ring[j])?;
        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    Ok(inside)
}

/// Even-odd test across every ring of a polygon, so holes exclude.
pub fn point_in_polygon(x: f64, y: f64, rings: &[Vec<Position>]) -> Result<bool, GeometryError> {
    if rings.is_empty() {
        return Err(GeometryError::EmptyPolygon);
    }
    let mut inside = false;
    for ring in rings {
        if point_in_ring(x, y, ring)? {
            inside = !inside;
        }
    }
    Ok(inside)
}

/// True if any member polygon contains the point.
pub fn point_in_multipolygon(
    x: f64,
    y: f64,
    polygons: &[Vec<Vec<Position>>],
) -> Result<bool, GeometryError> {
    for polygon in polygons {
        if point_in_polygon(x, y, polygon)? {
            return Ok(true);
        }
    }
    Ok(false)
}
