//! Location codes
//!
//! Pure conversions from a geographic point to the two independent code
//! schemes used to key per-location content: regional mesh codes and world
//! grid keys. Also parses free-text coordinates.

mod grid;
mod mesh;
mod parse;
mod types;

pub use grid::{grid_index_center, grid_indices, grid_key, grid_key_center, DEFAULT_GRID_MINUTES};
pub use mesh::{mesh_code, THIRD_ORDER_MAX, THIRD_ORDER_MIN};
pub use parse::parse_coordinates;
pub use types::{
    CoordError, Coordinate, GridIndex, MeshCode, MeshOrder, MAX_LAT, MAX_LON, MESH_MAX_LAT,
    MESH_MAX_LON, MESH_MIN_LAT, MESH_MIN_LON, MIN_LAT, MIN_LON,
};

/// Both code schemes computed for one point.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCodes {
    /// Tertiary (order 3) mesh code, absent outside the mesh band.
    pub mesh_code: Option<MeshCode>,
    /// World grid key at the configured minute size.
    pub world_grid: Option<String>,
}

impl LocationCodes {
    /// Computes the order-3 mesh code and the grid key for a coordinate.
    pub fn compute(coord: &Coordinate, grid_minutes: u32) -> Self {
        Self {
            mesh_code: mesh_code(coord.lat, coord.lon, MeshOrder::Third),
            world_grid: grid_key(coord.lon, coord.lat, grid_minutes),
        }
    }
}
