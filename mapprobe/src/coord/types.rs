//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Latitude band covered by the mesh code scheme
pub const MESH_MIN_LAT: f64 = 20.0;
pub const MESH_MAX_LAT: f64 = 46.0;

/// Longitude band covered by the mesh code scheme
pub const MESH_MIN_LON: f64 = 122.0;
pub const MESH_MAX_LON: f64 = 154.0;

/// A validated geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees (-90.0 to 90.0)
    pub lat: f64,
    /// Longitude in degrees (-180.0 to 180.0)
    pub lon: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Display label used when a location has no explicit name.
    pub fn default_label(&self) -> String {
        format!("Loc({:.4}, {:.4})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Subdivision level of a mesh code.
///
/// The half orders are intermediate cells: `FirstHalf` splits a primary
/// cell into 2×2 bands, `SecondHalf` picks a quadrant of a secondary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshOrder {
    First,
    FirstHalf,
    Second,
    SecondHalf,
    Third,
    Fourth,
}

impl MeshOrder {
    /// All supported orders, coarsest first.
    pub const ALL: [MeshOrder; 6] = [
        MeshOrder::First,
        MeshOrder::FirstHalf,
        MeshOrder::Second,
        MeshOrder::SecondHalf,
        MeshOrder::Third,
        MeshOrder::Fourth,
    ];

    /// Numeric form of the order (1, 1.5, 2, 2.5, 3, 4).
    pub fn as_f64(self) -> f64 {
        match self {
            MeshOrder::First => 1.0,
            MeshOrder::FirstHalf => 1.5,
            MeshOrder::Second => 2.0,
            MeshOrder::SecondHalf => 2.5,
            MeshOrder::Third => 3.0,
            MeshOrder::Fourth => 4.0,
        }
    }

    /// Looks up an order from its numeric form.
    pub fn from_f64(order: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_f64() == order)
    }
}

impl fmt::Display for MeshOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl FromStr for MeshOrder {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or_else(|| CoordError::Unparsable(s.to_string()))
    }
}

/// A mesh code at a given order.
///
/// Every order except [`MeshOrder::FirstHalf`] renders as a pure digit
/// string. The half-first order renders as `PPPP_ab`, the primary code
/// followed by the latitude and longitude half-band digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshCode {
    order: MeshOrder,
    code: String,
}

impl MeshCode {
    pub(super) fn new(order: MeshOrder, code: String) -> Self {
        Self { order, code }
    }

    pub fn order(&self) -> MeshOrder {
        self.order
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// The four-digit primary cell shared by every order.
    pub fn primary(&self) -> &str {
        &self.code[..4]
    }

    /// Integer value of the code, `None` for the textual half-first order.
    pub fn to_number(&self) -> Option<u64> {
        self.code.parse().ok()
    }
}

impl fmt::Display for MeshCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Index of a 10-minute cell on the global tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub lat_index: i32,
    pub lon_index: i32,
}

impl GridIndex {
    /// Stable identifier for the cell.
    pub fn id(&self) -> String {
        format!("{}_{}", self.lat_index, self.lon_index)
    }
}

/// Coordinate errors
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    InvalidLatitude(f64),
    InvalidLongitude(f64),
    Unparsable(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => write!(f, "Invalid latitude: {}", lat),
            CoordError::InvalidLongitude(lon) => write!(f, "Invalid longitude: {}", lon),
            CoordError::Unparsable(text) => write!(f, "Unrecognised coordinate text: {:?}", text),
        }
    }
}

impl std::error::Error for CoordError {}
