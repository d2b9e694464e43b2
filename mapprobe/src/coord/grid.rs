//! World grid keys.
//!
//! A key buckets each axis into `minute_size`-minute cells and encodes the
//! bucket midpoint as `degrees.minutes`, e.g. `139.45` is 139°45'. Keys are
//! formatted `"{lon}_{lat}"` without trailing zeros.

use super::types::{Coordinate, GridIndex, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Default bucket size in minutes.
pub const DEFAULT_GRID_MINUTES: u32 = 10;

/// Cell size of the global index grid (10 minutes).
const INDEX_CELL_DEGREES: f64 = 1.0 / 6.0;
const INDEX_LAT_CELLS: i32 = 1080;
const INDEX_LON_CELLS: i32 = 2160;

/// Computes the world grid key for a point.
///
/// Returns `None` if either coordinate is outside the global range or the
/// minute size is zero.
pub fn grid_key(lon: f64, lat: f64, minute_size: u32) -> Option<String> {
    if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
        return None;
    }
    if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return None;
    }
    if minute_size == 0 {
        return None;
    }

    let x = bucket_axis(lon, minute_size as f64);
    let y = bucket_axis(lat, minute_size as f64);
    Some(format!("{}_{}", x, y))
}

/// Decodes a grid key back into the decimal-degree midpoint of its cell.
///
/// Feeding the midpoint back into [`grid_key`] with the same minute size
/// reproduces the key.
pub fn grid_key_center(key: &str) -> Option<Coordinate> {
    let (lon, lat) = key.split_once('_')?;
    let lon = degrees_minutes_to_decimal(lon.parse().ok()?);
    let lat = degrees_minutes_to_decimal(lat.parse().ok()?);
    Coordinate::new(lat, lon).ok()
}

/// Index of the 10-minute global cell containing the point.
///
/// Out-of-range inputs are clamped onto the edge cells.
pub fn grid_indices(lat: f64, lon: f64) -> GridIndex {
    let lat_index = ((lat + 90.0) / INDEX_CELL_DEGREES).floor() as i32;
    let lon_index = ((lon + 180.0) / INDEX_CELL_DEGREES).floor() as i32;
    GridIndex {
        lat_index: lat_index.clamp(0, INDEX_LAT_CELLS - 1),
        lon_index: lon_index.clamp(0, INDEX_LON_CELLS - 1),
    }
}

/// Decimal-degree center of an index cell.
pub fn grid_index_center(index: GridIndex) -> (f64, f64) {
    let lat = index.lat_index as f64 * INDEX_CELL_DEGREES - 90.0 + INDEX_CELL_DEGREES / 2.0;
    let lon = index.lon_index as f64 * INDEX_CELL_DEGREES - 180.0 + INDEX_CELL_DEGREES / 2.0;
    (lat, lon)
}

fn bucket_axis(value: f64, minute_size: f64) -> f64 {
    let degrees = value.trunc();
    let remainder = (value - degrees).abs();
    let bucket =
        (remainder * 60.0 / minute_size).floor() * minute_size / 100.0 + minute_size / 200.0;
    let centered = if value >= 0.0 {
        degrees + bucket
    } else {
        degrees - bucket
    };
    round_hundredths(centered)
}

/// Rounds to two decimals with halves going toward positive infinity.
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

fn degrees_minutes_to_decimal(value: f64) -> f64 {
    let degrees = value.trunc();
    let minutes = ((value - degrees).abs() * 100.0).round();
    if value < 0.0 {
        degrees - minutes / 60.0
    } else {
        degrees + minutes / 60.0
    }
}
