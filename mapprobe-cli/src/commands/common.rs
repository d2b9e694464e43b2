//! Common argument parsing and file loading shared across CLI commands.

use std::path::Path;

use geojson::{Feature, GeoJson};

use mapprobe::query::SampleValue;
use mapprobe::style::Colormap;

use crate::error::CliError;

/// Joins positional coordinate words back into one text, so `35.6 139.7`
/// and `"35.6, 139.7"` are both accepted.
pub fn coordinate_text(words: &[String]) -> String {
    words.join(" ")
}

/// Loads the features of a GeoJSON file.
///
/// A lone feature is treated as a one-element collection.
pub fn read_geojson(path: &Path) -> Result<Vec<Feature>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| CliError::GeoJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => Err(CliError::GeoJson {
            path: path.to_path_buf(),
            message: "expected a Feature or FeatureCollection, found a bare geometry".to_string(),
        }),
    }
}

/// Splits `KEY=VALUE`.
pub fn parse_assignment<'a>(arg: &'a str, flag: &str) -> Result<(&'a str, &'a str), CliError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => Err(CliError::InvalidInput(format!(
            "{} expects ID=VALUE, got '{}'",
            flag, arg
        ))),
    }
}

/// Parses `MIN:MAX`.
pub fn parse_range(text: &str) -> Result<(f64, f64), CliError> {
    let invalid = || CliError::InvalidInput(format!("range expects MIN:MAX, got '{}'", text));
    let (min, max) = text.split_once(':').ok_or_else(invalid)?;
    let min: f64 = min.trim().parse().map_err(|_| invalid())?;
    let max: f64 = max.trim().parse().map_err(|_| invalid())?;
    Ok((min, max))
}

/// Parses a raster sample. `null` and `nodata` stand for a missing value.
pub fn parse_sample(text: &str) -> Result<SampleValue, CliError> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("nodata") {
        return Ok(SampleValue::Bands(vec![None]));
    }
    text.parse::<f64>()
        .map(SampleValue::number)
        .map_err(|_| CliError::InvalidInput(format!("sample value '{}' is not a number", text)))
}

/// Parses an optional colormap name, falling back to `default`.
pub fn parse_colormap(name: Option<&str>, default: Colormap) -> Result<Colormap, CliError> {
    match name {
        Some(name) => name
            .parse()
            .map_err(|e: mapprobe::style::UnknownColormap| CliError::InvalidInput(e.to_string())),
        None => Ok(default),
    }
}
