//! Spatial feature lookup
//!
//! Finds, per vector layer, the feature under or near a query point by a
//! linear scan: point features within a detection radius, polygons and
//! multipolygons by ray casting. No spatial index is kept between queries.

mod geometry;
mod locator;

pub use geometry::{
    haversine_distance, point_in_multipolygon, point_in_polygon, point_in_ring, GeometryError,
    EARTH_RADIUS_M,
};
pub use locator::{SpatialLocator, SpatialMatch, DEFAULT_DETECTION_RADIUS_M};
