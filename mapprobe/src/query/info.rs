//! What is known about a queried point.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::Value;

use crate::content::{resolve_location_key, LocationKey};
use crate::coord::{parse_coordinates, CoordError, Coordinate, LocationCodes};
use crate::layer::LocationCodeType;
use crate::spatial::SpatialMatch;
use crate::style::{category_label, format_number, numeric_value, FeatureStyle};

/// A value sampled from one layer at the query point.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// Raster band values at the pixel. The first band is the layer value.
    Bands(Vec<Option<f64>>),
    /// Property value of the matched vector feature.
    Property(Value),
}

impl SampleValue {
    pub fn number(value: f64) -> Self {
        SampleValue::Bands(vec![Some(value)])
    }

    /// The value to use, looking at the first element of multi-valued
    /// samples.
    fn primary(&self) -> Primary<'_> {
        match self {
            SampleValue::Bands(bands) => Primary::Number(bands.first().copied().flatten()),
            SampleValue::Property(Value::Array(items)) => Primary::Json(items.first()),
            SampleValue::Property(value) => Primary::Json(Some(value)),
        }
    }

    /// False for missing, null and NaN samples.
    pub fn is_valid(&self) -> bool {
        match self.primary() {
            Primary::Number(n) => n.is_some_and(|n| !n.is_nan()),
            Primary::Json(v) => v.is_some_and(|v| !v.is_null()),
        }
    }

    /// Numeric reading of the sample, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self.primary() {
            Primary::Number(n) => n.filter(|n| !n.is_nan()),
            Primary::Json(v) => v.and_then(numeric_value),
        }
    }

    /// The sample as JSON, for styling.
    pub fn as_json(&self) -> Option<Value> {
        match self.primary() {
            Primary::Number(n) => n.filter(|n| !n.is_nan()).map(Value::from),
            Primary::Json(v) => v.filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Display text. Raster values are rounded to four decimals.
    pub fn display(&self) -> String {
        match self.primary() {
            Primary::Number(Some(n)) if !n.is_nan() => format_number((n * 1e4).round() / 1e4),
            Primary::Json(Some(v)) if !v.is_null() => category_label(v),
            _ => "no data".to_string(),
        }
    }
}

enum Primary<'a> {
    Number(Option<f64>),
    Json(Option<&'a Value>),
}

/// A layer's value at the point and the style it renders with.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSample {
    pub layer_id: String,
    /// Property the value was read from, for vector layers.
    pub property: Option<String>,
    pub value: SampleValue,
    pub style: FeatureStyle,
}

/// A point query as issued by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryInput {
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
    /// Explicit location identifier.
    pub id: Option<String>,
    /// Raster samples by layer id, read by the caller from the raster data.
    pub raster_samples: HashMap<String, SampleValue>,
}

impl QueryInput {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Self::default()
        }
    }

    /// Query at a coordinate given as text.
    pub fn from_text(text: &str) -> Result<Self, CoordError> {
        let coord = parse_coordinates(text)?;
        Ok(Self::at(coord.lat, coord.lon))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sample(mut self, layer_id: impl Into<String>, value: SampleValue) -> Self {
        self.raster_samples.insert(layer_id.into(), value);
        self
    }
}

/// Everything computed for a queried point.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub coordinate: Coordinate,
    pub name: String,
    pub id: Option<String>,
    /// Samples of active layers, most recently activated first.
    pub samples: Vec<LayerSample>,
    pub matches: Vec<SpatialMatch>,
    pub codes: LocationCodes,
    /// Code scheme used to key content.
    pub code_type: LocationCodeType,
}

impl LocationInfo {
    pub fn sample(&self, layer_id: &str) -> Option<&LayerSample> {
        self.samples.iter().find(|s| s.layer_id == layer_id)
    }

    pub fn feature_match(&self, layer_id: &str) -> Option<&SpatialMatch> {
        self.matches.iter().find(|m| m.layer_id == layer_id)
    }

    /// Whether the layer has a usable value at the point.
    pub fn has_valid_value(&self, layer_id: &str) -> bool {
        self.sample(layer_id).is_some_and(|s| s.value.is_valid())
    }

    /// Content key for the point.
    pub fn location_key(&self, reserved_prefix: &str) -> Option<LocationKey> {
        resolve_location_key(self.id.as_deref(), &self.codes, self.code_type, reserved_prefix)
    }

    /// Human-readable summary, one fact per line.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} (LAT, LON) = ({:.4}, {:.4})",
            self.name, self.coordinate.lat, self.coordinate.lon
        ));
        if let Some(id) = &self.id {
            lines.push(format!("ID: {}", id));
        }

        for sample in self.samples.iter().filter(|s| s.value.is_valid()) {
            let mut line = sample.layer_id.clone();
            if let Some(property) = &sample.property {
                let _ = write!(line, " > {}", property);
            }
            let _ = write!(line, ": {}", sample.value.display());
            lines.push(line);
        }

        match self.code_type {
            LocationCodeType::MeshCode => lines.push(format!(
                "mesh code (3rd order): {}",
                self.codes
                    .mesh_code
                    .as_ref()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "out of range".to_string())
            )),
            LocationCodeType::WorldGrid => lines.push(format!(
                "world grid key: {}",
                self.codes.world_grid.as_deref().unwrap_or("out of range")
            )),
            LocationCodeType::None => {}
        }
        lines
    }
}
