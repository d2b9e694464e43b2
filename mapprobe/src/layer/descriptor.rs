//! Layer descriptors as published in the layer list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of the layer consulted when no layer is active.
pub const DEFAULT_LAYER_ID: &str = "__default__";

/// Kind of data a layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    Vector,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Raster => f.write_str("raster"),
            LayerKind::Vector => f.write_str("vector"),
        }
    }
}

/// How per-location content is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Static image, probed with a lightweight existence check.
    #[default]
    Image,
    /// Embedded document, probed with a full load.
    #[serde(alias = "iframe")]
    Embedded,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Image => "image",
            DisplayMode::Embedded => "embedded",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(DisplayMode::Image),
            "embedded" | "iframe" => Ok(DisplayMode::Embedded),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

/// URL composition style for embedded documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    /// `{base}{key}_{slot}.{ext}`
    #[default]
    Raw,
    /// `{urlbase}&arg={key}&p={slot}`
    Arg,
}

impl UrlType {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlType::Raw => "raw",
            UrlType::Arg => "arg",
        }
    }
}

impl FromStr for UrlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(UrlType::Raw),
            "arg" => Ok(UrlType::Arg),
            other => Err(format!("unknown url type '{}'", other)),
        }
    }
}

/// Code scheme used to key content for a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationCodeType {
    #[serde(rename = "meshCode")]
    MeshCode,
    #[default]
    #[serde(rename = "worldGrid")]
    WorldGrid,
    #[serde(rename = "none")]
    None,
}

impl LocationCodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationCodeType::MeshCode => "meshCode",
            LocationCodeType::WorldGrid => "worldGrid",
            LocationCodeType::None => "none",
        }
    }
}

impl fmt::Display for LocationCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationCodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "meshCode" | "meshcode" | "mesh" => Ok(LocationCodeType::MeshCode),
            "worldGrid" | "worldgrid" | "grid" => Ok(LocationCodeType::WorldGrid),
            "none" => Ok(LocationCodeType::None),
            other => Err(format!("unknown location code type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCodeSpec {
    #[serde(rename = "type")]
    pub code_type: LocationCodeType,
}

/// Per-layer content locations. Unset fields fall back to project defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPaths {
    pub basedir: Option<String>,
    pub base_url: Option<String>,
    pub id_basedir: Option<String>,
    pub id_base_url: Option<String>,
    pub fallback_image: Option<String>,
    pub timeout_image: Option<String>,
}

/// One entry of the layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default)]
    pub name: Option<String>,
    /// Data source (GeoTIFF, GeoJSON or CSV location).
    #[serde(default, alias = "file")]
    pub url: Option<String>,
    #[serde(default)]
    pub default_colormap: Option<String>,
    #[serde(default)]
    pub default_opacity: Option<f64>,
    #[serde(default)]
    pub property_field: Option<String>,
    #[serde(default)]
    pub location_code: Option<LocationCodeSpec>,
    #[serde(default)]
    pub display_mode: Option<DisplayMode>,
    #[serde(default, rename = "urltype")]
    pub url_type: Option<UrlType>,
    #[serde(default, rename = "urlbase")]
    pub url_base: Option<String>,
    #[serde(default)]
    pub paths: Option<LayerPaths>,
}

impl LayerDescriptor {
    /// Minimal descriptor, mostly for tests and ad-hoc layers.
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            url: None,
            default_colormap: None,
            default_opacity: None,
            property_field: None,
            location_code: None,
            display_mode: None,
            url_type: None,
            url_base: None,
            paths: None,
        }
    }

    /// Human-readable name, the id if unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn location_code_type(&self) -> Option<LocationCodeType> {
        self.location_code.map(|spec| spec.code_type)
    }
}

/// Derives a vector layer id from a data file name.
///
/// `"Land Use.geojson"` becomes `"vector_land_use"`.
pub fn vector_layer_id(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 && !file_name[dot..].contains('/') => &file_name[..dot],
        _ => file_name,
    };
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("vector_{}", sanitized.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_descriptor() {
        let json = r#"{
            "id": "temp",
            "type": "raster",
            "name": "Temperature",
            "url": "data/temp.tif",
            "defaultColormap": "RdYlBu",
            "defaultOpacity": 0.6,
            "locationCode": {"type": "meshCode"},
            "displayMode": "iframe",
            "urltype": "arg",
            "urlbase": "https://example.org/view?x=1",
            "paths": {"basedir": "img/", "idBaseUrl": "assets/"}
        }"#;
        let layer: LayerDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(layer.kind, LayerKind::Raster);
        assert_eq!(layer.display_name(), "Temperature");
        assert_eq!(layer.display_mode, Some(DisplayMode::Embedded));
        assert_eq!(layer.url_type, Some(UrlType::Arg));
        assert_eq!(layer.location_code_type(), Some(LocationCodeType::MeshCode));
        let paths = layer.paths.unwrap();
        assert_eq!(paths.basedir.as_deref(), Some("img/"));
        assert_eq!(paths.id_base_url.as_deref(), Some("assets/"));
        assert_eq!(paths.base_url, None);
    }

    #[test]
    fn test_deserialize_minimal_descriptor() {
        let layer: LayerDescriptor =
            serde_json::from_str(r#"{"id": "roads", "type": "vector"}"#).unwrap();
        assert_eq!(layer, LayerDescriptor::new("roads", LayerKind::Vector));
        assert_eq!(layer.display_name(), "roads");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = serde_json::from_str::<LayerDescriptor>(r#"{"id": "x", "type": "tiles"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_enums_from_text() {
        assert_eq!("iframe".parse::<DisplayMode>().unwrap(), DisplayMode::Embedded);
        assert_eq!("Image".parse::<DisplayMode>().unwrap(), DisplayMode::Image);
        assert_eq!("arg".parse::<UrlType>().unwrap(), UrlType::Arg);
        assert_eq!(
            "worldGrid".parse::<LocationCodeType>().unwrap(),
            LocationCodeType::WorldGrid
        );
        assert!("video".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_vector_layer_id() {
        assert_eq!(vector_layer_id("Land Use.geojson"), "vector_land_use");
        assert_eq!(vector_layer_id("roads"), "vector_roads");
        assert_eq!(vector_layer_id("a.b.json"), "vector_a_b");
    }
}
