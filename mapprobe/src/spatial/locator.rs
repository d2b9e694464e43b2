//! Per-layer feature lookup at a query point.

use geojson::{Feature, Value as GeometryValue};
use serde_json::Value;
use tracing::{debug, warn};

use super::geometry::{
    haversine_distance, point_in_multipolygon, point_in_polygon, xy, GeometryError,
};
use crate::coord::Coordinate;

/// Point features closer than this are considered hit.
pub const DEFAULT_DETECTION_RADIUS_M: f64 = 100.0;

/// The feature found for one vector layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialMatch {
    pub layer_id: String,
    /// Position of the feature within its collection.
    pub feature_index: usize,
    pub feature: Feature,
}

impl SpatialMatch {
    /// Value of a property on the matched feature.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name))
    }
}

/// Linear-scan locator over loaded feature collections.
#[derive(Debug, Clone, Copy)]
pub struct SpatialLocator {
    detection_radius_m: f64,
}

impl Default for SpatialLocator {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTION_RADIUS_M)
    }
}

impl SpatialLocator {
    pub fn new(detection_radius_m: f64) -> Self {
        Self { detection_radius_m }
    }

    pub fn detection_radius_m(&self) -> f64 {
        self.detection_radius_m
    }

    /// First feature in `features` that covers or is near `point`.
    ///
    /// Features with malformed geometry are logged and skipped.
    pub fn find<'a>(
        &self,
        layer_id: &str,
        point: &Coordinate,
        features: &'a [Feature],
    ) -> Option<(usize, &'a Feature)> {
        for (index, feature) in features.iter().enumerate() {
            match self.hits(point, feature) {
                Ok(true) => {
                    debug!(layer = layer_id, index, "feature matched query point");
                    return Some((index, feature));
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(layer = layer_id, index, error = %e, "skipping malformed feature");
                }
            }
        }
        None
    }

    /// At most one match per layer, in the order the layers are given.
    pub fn locate<'a, I>(&self, point: &Coordinate, layers: I) -> Vec<SpatialMatch>
    where
        I: IntoIterator<Item = (&'a str, &'a [Feature])>,
    {
        layers
            .into_iter()
            .filter_map(|(layer_id, features)| {
                self.find(layer_id, point, features)
                    .map(|(feature_index, feature)| SpatialMatch {
                        layer_id: layer_id.to_string(),
                        feature_index,
                        feature: feature.clone(),
                    })
            })
            .collect()
    }

    fn hits(&self, point: &Coordinate, feature: &Feature) -> Result<bool, GeometryError> {
        let Some(geometry) = feature.geometry.as_ref() else {
            return Ok(false);
        };

        match &geometry.value {
            GeometryValue::Point(position) => {
                let (lon, lat) = xy(position)?;
                let distance = haversine_distance(point.lat, point.lon, lat, lon);
                Ok(distance < self.detection_radius_m)
            }
            GeometryValue::Polygon(rings) => point_in_polygon(point.lon, point.lat, rings),
            GeometryValue::MultiPolygon(polygons) => {
                point_in_multipolygon(point.lon, point.lat, polygons)
            }
            _ => Ok(false),
        }
    }
}
