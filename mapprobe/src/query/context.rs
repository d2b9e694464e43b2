//! Query context.
//!
//! [`QueryContext`] owns everything a query reads: the layer registry, the
//! active layer state, loaded vector data and the content settings. It is
//! passed explicitly; nothing here is global.

use std::collections::HashMap;

use geojson::Feature;
use tracing::{debug, warn};

use super::info::{LayerSample, LocationInfo, QueryInput, SampleValue};
use super::QueryError;
use crate::content::{Candidate, ContentRequest, ContentSettings, ResolvedPaths};
use crate::coord::{Coordinate, LocationCodes, DEFAULT_GRID_MINUTES};
use crate::layer::{
    LayerDescriptor, LayerKind, LayerRegistry, LayerRuntimeState, LayerStateStore,
    LocationCodeType, StyleDefaults,
};
use crate::spatial::SpatialLocator;
use crate::style::{style_number, style_value};

/// Data handed over when a layer is switched on.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    /// Value span of a raster layer.
    Raster { min: f64, max: f64 },
    /// Features of a vector layer.
    Vector(Vec<Feature>),
}

/// Shared state consulted by every query.
#[derive(Debug, Clone)]
pub struct QueryContext {
    registry: LayerRegistry,
    layers: LayerStateStore,
    features: HashMap<String, Vec<Feature>>,
    locator: SpatialLocator,
    content: ContentSettings,
    grid_minutes: u32,
    default_code_type: LocationCodeType,
}

impl QueryContext {
    pub fn new(registry: LayerRegistry, style: StyleDefaults, content: ContentSettings) -> Self {
        Self {
            registry,
            layers: LayerStateStore::new(style),
            features: HashMap::new(),
            locator: SpatialLocator::default(),
            content,
            grid_minutes: DEFAULT_GRID_MINUTES,
            default_code_type: LocationCodeType::default(),
        }
    }

    pub fn with_locator(mut self, locator: SpatialLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_grid_minutes(mut self, minutes: u32) -> Self {
        self.grid_minutes = minutes;
        self
    }

    pub fn with_default_code_type(mut self, code_type: LocationCodeType) -> Self {
        self.default_code_type = code_type;
        self
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn layers(&self) -> &LayerStateStore {
        &self.layers
    }

    /// Mutable layer state, for the styling setters.
    pub fn layers_mut(&mut self) -> &mut LayerStateStore {
        &mut self.layers
    }

    pub fn content_settings(&self) -> &ContentSettings {
        &self.content
    }

    pub fn features(&self, layer_id: &str) -> Option<&[Feature]> {
        self.features.get(layer_id).map(Vec::as_slice)
    }

    /// Activates a registered layer.
    ///
    /// Returns `Ok(None)` if the id is not in the registry.
    pub fn activate(
        &mut self,
        layer_id: &str,
        data: LayerData,
    ) -> Result<Option<&LayerRuntimeState>, QueryError> {
        let Some(descriptor) = self.registry.get(layer_id) else {
            return Ok(None);
        };

        match data {
            LayerData::Raster { min, max } => {
                self.layers.activate_raster(descriptor, min, max)?;
            }
            LayerData::Vector(features) => {
                self.layers.activate_vector(descriptor, &features)?;
                self.features.insert(layer_id.to_string(), features);
            }
        }
        Ok(self.layers.get(layer_id))
    }

    /// Deactivates a layer and drops its data. Returns whether it was active.
    pub fn deactivate(&mut self, layer_id: &str) -> bool {
        self.features.remove(layer_id);
        self.layers.deactivate(layer_id).is_some()
    }

    /// Switches the displayed property of an active vector layer.
    ///
    /// The layer's descriptor is looked up before reclassifying so palette
    /// defaults are resolved against it. Returns `Ok(None)` for unknown ids.
    pub fn set_property(
        &mut self,
        layer_id: &str,
        property: &str,
    ) -> Result<Option<&LayerRuntimeState>, QueryError> {
        let Some(descriptor) = self.registry.get(layer_id) else {
            return Ok(None);
        };
        let features = self.features.get(layer_id).map(Vec::as_slice).unwrap_or(&[]);
        let state = self.layers.set_property(descriptor, features, property)?;
        Ok(Some(state))
    }

    /// Descriptor that decides per-query defaults: the most recently
    /// activated layer, or the default layer when none is active.
    pub fn current_descriptor(&self) -> Option<&LayerDescriptor> {
        match self.layers.current_layer_id() {
            Some(id) => self.registry.get(id),
            None => self.registry.resolve(None),
        }
    }

    /// Code scheme for content keys.
    pub fn code_type(&self) -> LocationCodeType {
        self.current_descriptor()
            .and_then(LayerDescriptor::location_code_type)
            .unwrap_or(self.default_code_type)
    }

    /// Computes codes, samples and spatial matches for a validated point.
    pub fn location_info(&self, coordinate: Coordinate, input: &QueryInput) -> LocationInfo {
        let mut samples = Vec::new();
        let mut matches = Vec::new();

        for layer_id in self.layers.active_ids() {
            let Some(state) = self.layers.get(layer_id) else {
                continue;
            };
            match state.kind() {
                LayerKind::Raster => {
                    if let Some(value) = input.raster_samples.get(layer_id) {
                        let style =
                            style_number(value.as_number(), state.color_rule(), state.opacity());
                        samples.push(LayerSample {
                            layer_id: layer_id.to_string(),
                            property: None,
                            value: value.clone(),
                            style,
                        });
                    }
                }
                LayerKind::Vector => {
                    let features = self.features(layer_id).unwrap_or(&[]);
                    let Some(found) = self.locator.locate(&coordinate, [(layer_id, features)]).pop()
                    else {
                        continue;
                    };
                    let property = state.property().map(str::to_string);
                    let raw = property.as_deref().and_then(|p| found.property(p)).cloned();
                    if let Some(raw) = raw {
                        let value = SampleValue::Property(raw);
                        let json = value.as_json();
                        let style = style_value(json.as_ref(), state.color_rule(), state.opacity());
                        samples.push(LayerSample {
                            layer_id: layer_id.to_string(),
                            property,
                            value,
                            style,
                        });
                    }
                    matches.push(found);
                }
            }
        }

        let code_type = self.code_type();
        debug!(
            lat = coordinate.lat,
            lon = coordinate.lon,
            samples = samples.len(),
            matches = matches.len(),
            code_type = %code_type,
            "location info assembled"
        );

        LocationInfo {
            coordinate,
            name: input
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| coordinate.default_label()),
            id: input.id.clone().filter(|id| !id.is_empty()),
            samples,
            matches,
            codes: LocationCodes::compute(&coordinate, self.grid_minutes),
            code_type,
        }
    }

    /// Content candidates for a point, most recently activated layer first.
    pub fn content_request(&self, info: &LocationInfo) -> ContentRequest {
        let key = info.location_key(&self.content.reserved_id_prefix);
        let candidates = self
            .layers
            .active_ids()
            .map(|layer_id| {
                let descriptor = self.registry.get(layer_id);
                if descriptor.is_none() {
                    warn!(layer = layer_id, "active layer has no descriptor, using project paths");
                }
                Candidate {
                    layer_id: layer_id.to_string(),
                    title: descriptor
                        .map(|d| d.display_name().to_string())
                        .unwrap_or_else(|| layer_id.to_string()),
                    paths: ResolvedPaths::for_layer(descriptor, &self.content),
                    mode: descriptor
                        .and_then(|d| d.display_mode)
                        .unwrap_or(self.content.display_mode),
                    has_value: info.has_valid_value(layer_id),
                }
            })
            .collect();

        ContentRequest { key, candidates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::DisplayMode;
    use serde_json::json;

    fn registry() -> LayerRegistry {
        LayerRegistry::from_json(
            r#"{"layers": [
                {"id": "temp", "type": "raster", "name": "Temperature",
                 "locationCode": {"type": "meshCode"}, "paths": {"basedir": "temp/"}},
                {"id": "zones", "type": "vector", "propertyField": "zone",
                 "displayMode": "embedded"},
                {"id": "__default__", "type": "raster", "locationCode": {"type": "none"}}
            ]}"#,
        )
        .unwrap()
    }

    fn square(zone: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [[
                [139.0, 35.0], [140.0, 35.0], [140.0, 36.0], [139.0, 36.0], [139.0, 35.0]
            ]]},
            "properties": {"zone": zone}
        }))
        .unwrap()
    }

    fn context() -> QueryContext {
        QueryContext::new(registry(), StyleDefaults::default(), ContentSettings::default())
    }

    fn tokyo() -> Coordinate {
        Coordinate::new(35.681236, 139.767125).unwrap()
    }

    #[test]
    fn test_unknown_layer_is_not_activated() {
        let mut ctx = context();
        let result = ctx.activate("missing", LayerData::Raster { min: 0.0, max: 1.0 });
        assert!(matches!(result, Ok(None)));
        assert!(ctx.layers().is_empty());
    }

    #[test]
    fn test_code_type_follows_current_layer() {
        let mut ctx = context();
        assert_eq!(ctx.code_type(), LocationCodeType::None, "default layer decides");

        ctx.activate("temp", LayerData::Raster { min: 0.0, max: 30.0 })
            .unwrap();
        assert_eq!(ctx.code_type(), LocationCodeType::MeshCode);

        ctx.activate("zones", LayerData::Vector(vec![square("A")]))
            .unwrap();
        assert_eq!(
            ctx.code_type(),
            LocationCodeType::WorldGrid,
            "layers without a code type use the configured default"
        );
    }

    #[test]
    fn test_location_info_samples_and_matches() {
        let mut ctx = context();
        ctx.activate("temp", LayerData::Raster { min: 0.0, max: 30.0 })
            .unwrap();
        ctx.activate("zones", LayerData::Vector(vec![square("A")]))
            .unwrap();

        let input = QueryInput::at(35.681236, 139.767125)
            .with_sample("temp", SampleValue::number(15.0));
        let info = ctx.location_info(tokyo(), &input);

        assert_eq!(info.samples.len(), 2);
        assert_eq!(info.samples[0].layer_id, "zones", "most recent layer first");
        assert_eq!(info.samples[0].property.as_deref(), Some("zone"));
        assert_eq!(info.samples[0].value, SampleValue::Property(json!("A")));
        assert!(!info.samples[0].style.no_data);
        assert_eq!(info.matches.len(), 1);
        assert!(info.has_valid_value("temp"));
        assert_eq!(info.name, "Loc(35.6812, 139.7671)");
    }

    #[test]
    fn test_content_request_candidates() {
        let mut ctx = context();
        ctx.activate("temp", LayerData::Raster { min: 0.0, max: 30.0 })
            .unwrap();
        ctx.activate("zones", LayerData::Vector(vec![square("A")]))
            .unwrap();

        let info = ctx.location_info(tokyo(), &QueryInput::at(35.681236, 139.767125));
        let request = ctx.content_request(&info);

        assert_eq!(request.candidates.len(), 2);
        let zones = &request.candidates[0];
        assert_eq!(zones.layer_id, "zones");
        assert_eq!(zones.mode, DisplayMode::Embedded);
        assert!(zones.has_value);

        let temp = &request.candidates[1];
        assert_eq!(temp.title, "Temperature");
        assert_eq!(temp.paths.basedir, "temp/");
        assert!(!temp.has_value, "no raster sample was supplied");

        let key = request.key.unwrap();
        assert_eq!(key.key, info.codes.world_grid.unwrap());
    }

    #[test]
    fn test_set_property_uses_registry_descriptor() {
        let mut ctx = context();
        let features = vec![
            serde_json::from_value(json!({
                "type": "Feature", "geometry": null,
                "properties": {"zone": "A", "height": 3}
            }))
            .unwrap(),
        ];
        ctx.activate("zones", LayerData::Vector(features)).unwrap();

        let state = ctx.set_property("zones", "height").unwrap().unwrap();
        assert_eq!(state.property(), Some("height"));
        assert!(state.classification().is_numeric());
        assert!(ctx.set_property("unknown", "height").unwrap().is_none());
    }

    #[test]
    fn test_deactivate_drops_features() {
        let mut ctx = context();
        ctx.activate("zones", LayerData::Vector(vec![square("A")]))
            .unwrap();
        assert!(ctx.features("zones").is_some());
        assert!(ctx.deactivate("zones"));
        assert!(ctx.features("zones").is_none());
        assert!(!ctx.deactivate("zones"));
    }
}
