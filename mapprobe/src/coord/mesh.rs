//! Standard regional mesh codes.
//!
//! A primary cell spans 40 minutes of latitude by 1 degree of longitude and
//! is subdivided 8×8 (secondary), then 10×10 (tertiary, ~1km), then 10×10
//! again (quaternary). Codes are only defined inside the covered band.

use super::types::{MeshCode, MeshOrder, MESH_MAX_LAT, MESH_MAX_LON, MESH_MIN_LAT, MESH_MIN_LON};

/// Smallest and largest valid tertiary (order 3) code.
pub const THIRD_ORDER_MIN: u64 = 10_000_000;
pub const THIRD_ORDER_MAX: u64 = 99_999_999;

/// Digits extracted from one axis, coarsest first.
#[derive(Debug, Clone, Copy)]
struct AxisDigits {
    first: f64,
    half: f64,
    second: f64,
    third: f64,
    fourth: f64,
}

impl AxisDigits {
    fn latitude(lat: f64) -> Self {
        let minutes = lat * 60.0;
        let first = (minutes / 40.0).floor();
        let mut rest = minutes - first * 40.0;
        let second = (rest / 5.0).floor();
        let half = (rest / 10.0).floor();
        rest -= second * 5.0;
        let third = (rest / (5.0 / 10.0)).floor();
        rest -= third * 5.0 / 10.0;
        let fourth = (rest / (5.0 / 100.0)).floor();

        Self {
            first,
            half,
            second,
            third,
            fourth,
        }
    }

    fn longitude(lon: f64) -> Self {
        let degrees = lon.floor();
        let first = degrees - 100.0;
        let mut rest = lon - degrees;
        let second = (rest * 8.0).floor();
        let half = (rest * 4.0).floor();
        rest -= second / 8.0;
        let third = (rest / (1.0 / 80.0)).floor();
        rest -= third / 80.0;
        let fourth = (rest / (1.0 / 800.0)).floor();

        Self {
            first,
            half,
            second,
            third,
            fourth,
        }
    }

    fn within_bounds(&self, order: MeshOrder) -> bool {
        let base = (0.0..=99.0).contains(&self.first)
            && (0.0..=7.0).contains(&self.second)
            && (0.0..=9.0).contains(&self.third);
        match order {
            MeshOrder::FirstHalf => base && (0.0..=3.0).contains(&self.half),
            MeshOrder::Fourth => base && (0.0..=9.0).contains(&self.fourth),
            _ => base,
        }
    }
}

/// Computes the mesh code of a point at the requested order.
///
/// Returns `None` outside the covered band (latitude 20 to 46, longitude
/// 122 to 154), for non-finite input, or when any digit falls outside its
/// bound.
pub fn mesh_code(lat: f64, lon: f64, order: MeshOrder) -> Option<MeshCode> {
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    if !(MESH_MIN_LAT..=MESH_MAX_LAT).contains(&lat) || !(MESH_MIN_LON..=MESH_MAX_LON).contains(&lon)
    {
        return None;
    }

    let y = AxisDigits::latitude(lat);
    let x = AxisDigits::longitude(lon);
    if !y.within_bounds(order) || !x.within_bounds(order) {
        return None;
    }

    let mut code = format!("{:02}{:02}", y.first as u32, x.first as u32);

    if order == MeshOrder::FirstHalf {
        code.push_str(&format!("_{}{}", y.half as u32, x.half as u32));
        return Some(MeshCode::new(order, code));
    }

    if order >= MeshOrder::Second {
        code.push_str(&format!("{}{}", y.second as u32, x.second as u32));
    }
    if order >= MeshOrder::Third {
        code.push_str(&format!("{}{}", y.third as u32, x.third as u32));
    }
    if order >= MeshOrder::Fourth {
        code.push_str(&format!("{}{}", y.fourth as u32, x.fourth as u32));
    }
    if order == MeshOrder::SecondHalf {
        code.push(quadrant_digit(y.third, x.third));
    }

    let mesh = MeshCode::new(order, code);
    if order == MeshOrder::Third {
        let value = mesh.to_number()?;
        if !(THIRD_ORDER_MIN..=THIRD_ORDER_MAX).contains(&value) {
            return None;
        }
    }
    Some(mesh)
}

/// Quadrant of a secondary cell, numbered south-west first.
fn quadrant_digit(lat_third: f64, lon_third: f64) -> char {
    match (lat_third <= 4.0, lon_third <= 4.0) {
        (true, true) => '1',
        (true, false) => '2',
        (false, true) => '3',
        (false, false) => '4',
    }
}
