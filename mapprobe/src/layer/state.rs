//! Runtime state of active layers.
//!
//! A layer gets a [`LayerRuntimeState`] when activated and loses it on
//! deactivation. Setters only touch active layers.

use std::collections::HashMap;

use geojson::Feature;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::descriptor::{LayerDescriptor, LayerKind};
use crate::style::{
    classify_properties, detect_property_type, extract_categories, generate_category_colors,
    property_range, CategoryPalette, Classification, ColorRule, Colormap, PresetPalette,
    ValueRange, DEFAULT_FEATURE_SAMPLE_SIZE, DEFAULT_MAX_PRESET_CATEGORIES, RANGE_PAD,
};

/// Raster layers that may be active at once.
pub const DEFAULT_MAX_SELECTABLE_RASTER: usize = 2;

/// Opacity of a layer whose descriptor names none.
pub const DEFAULT_OPACITY: f64 = 0.7;

/// Palette used for categorical layers.
pub const DEFAULT_PALETTE: &str = "colorful";

/// Layer state errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("layer '{0}' is not active")]
    NotActive(String),

    #[error("at most {max} raster layers can be active")]
    SelectionLimit { max: usize },

    #[error("invalid value range [{min}, {max}]: both bounds must be finite and min < max")]
    InvalidRange { min: f64, max: f64 },

    #[error("layer '{id}' is {found}, expected {expected}")]
    KindMismatch {
        id: String,
        expected: LayerKind,
        found: LayerKind,
    },

    #[error("layer '{0}' has no displayable properties")]
    NoProperty(String),

    #[error("layer '{0}' is not categorical")]
    NotCategorical(String),
}

/// Defaults applied when a descriptor leaves styling unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    pub colormap: Colormap,
    pub opacity: f64,
    pub palette: String,
    pub feature_sample_size: usize,
    pub max_preset_categories: usize,
    pub max_selectable_raster: usize,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            opacity: DEFAULT_OPACITY,
            palette: DEFAULT_PALETTE.to_string(),
            feature_sample_size: DEFAULT_FEATURE_SAMPLE_SIZE,
            max_preset_categories: DEFAULT_MAX_PRESET_CATEGORIES,
            max_selectable_raster: DEFAULT_MAX_SELECTABLE_RASTER,
        }
    }
}

/// Styling state of one active layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRuntimeState {
    kind: LayerKind,
    property: Option<String>,
    classification: Classification,
    range: ValueRange,
    colormap: Colormap,
    categories: Vec<String>,
    palette_name: String,
    palette: CategoryPalette,
    opacity: f64,
    reverse: bool,
}

impl LayerRuntimeState {
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Property driving the colors of a vector layer.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn range(&self) -> &ValueRange {
        &self.range
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    /// Palette name category colors are drawn from.
    pub fn palette_name(&self) -> &str {
        &self.palette_name
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// The rule to color this layer's values with.
    pub fn color_rule(&self) -> ColorRule<'_> {
        match self.classification {
            Classification::Numeric => ColorRule::Numeric {
                range: &self.range,
                colormap: self.colormap,
                reverse: self.reverse,
            },
            Classification::Categorical(_) => ColorRule::Categorical {
                palette: &self.palette,
            },
        }
    }
}

/// Active layers in activation order with their runtime state.
#[derive(Debug, Clone, Default)]
pub struct LayerStateStore {
    states: HashMap<String, LayerRuntimeState>,
    /// Oldest first.
    active: Vec<String>,
    defaults: StyleDefaults,
}

impl LayerStateStore {
    pub fn new(defaults: StyleDefaults) -> Self {
        Self {
            states: HashMap::new(),
            active: Vec::new(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// Activates a raster layer whose data spans `[min, max]`.
    ///
    /// Re-activating an active layer keeps its state. A single-valued
    /// raster is padded like a single-valued vector property.
    pub fn activate_raster(
        &mut self,
        layer: &LayerDescriptor,
        min: f64,
        max: f64,
    ) -> Result<&LayerRuntimeState, StateError> {
        expect_kind(layer, LayerKind::Raster)?;

        if !self.states.contains_key(&layer.id) {
            let limit = self.defaults.max_selectable_raster;
            if self.count_of(LayerKind::Raster) >= limit {
                return Err(StateError::SelectionLimit { max: limit });
            }

            let range = if min.is_finite() && min == max {
                ValueRange::new(min - RANGE_PAD, max + RANGE_PAD)
            } else {
                checked_range(min, max)?
            };

            let state = LayerRuntimeState {
                kind: LayerKind::Raster,
                property: None,
                classification: Classification::Numeric,
                range,
                colormap: self.descriptor_colormap(layer),
                categories: Vec::new(),
                palette_name: self.descriptor_palette(layer),
                palette: CategoryPalette::default(),
                opacity: self.descriptor_opacity(layer),
                reverse: false,
            };
            info!(layer = %layer.id, min = range.min, max = range.max, "raster layer activated");
            self.insert(layer.id.clone(), state);
        }

        self.require(&layer.id)
    }

    /// Activates a vector layer over its loaded features.
    ///
    /// The descriptor's `propertyField` wins; otherwise the first numeric
    /// property, then the first categorical one.
    pub fn activate_vector(
        &mut self,
        layer: &LayerDescriptor,
        features: &[Feature],
    ) -> Result<&LayerRuntimeState, StateError> {
        expect_kind(layer, LayerKind::Vector)?;

        if !self.states.contains_key(&layer.id) {
            let property = match &layer.property_field {
                Some(field) => field.clone(),
                None => {
                    let classes = classify_properties(features, self.defaults.feature_sample_size);
                    classes
                        .numeric
                        .into_iter()
                        .chain(classes.categorical)
                        .next()
                        .ok_or_else(|| StateError::NoProperty(layer.id.clone()))?
                }
            };

            let palette_name = self.descriptor_palette(layer);
            let state = self.classify_vector(layer, features, property, palette_name);
            info!(
                layer = %layer.id,
                property = state.property().unwrap_or_default(),
                classification = state.classification.label(),
                "vector layer activated"
            );
            self.insert(layer.id.clone(), state);
        }

        self.require(&layer.id)
    }

    /// Drops a layer and its state. Returns the state it had.
    pub fn deactivate(&mut self, id: &str) -> Option<LayerRuntimeState> {
        self.active.retain(|active| active != id);
        let removed = self.states.remove(id);
        if removed.is_some() {
            info!(layer = id, "layer deactivated");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&LayerRuntimeState> {
        self.states.get(id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Active layer ids, most recently activated first.
    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.active.iter().rev().map(String::as_str)
    }

    /// The most recently activated layer.
    pub fn current_layer_id(&self) -> Option<&str> {
        self.active.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn set_colormap(&mut self, id: &str, colormap: Colormap) -> Result<(), StateError> {
        self.require_mut(id)?.colormap = colormap;
        debug!(layer = id, colormap = %colormap, "colormap changed");
        Ok(())
    }

    /// Sets opacity, clamped to 0..=1.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> Result<(), StateError> {
        let clamped = if opacity.is_nan() {
            DEFAULT_OPACITY
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.require_mut(id)?.opacity = clamped;
        Ok(())
    }

    pub fn set_reverse(&mut self, id: &str, reverse: bool) -> Result<(), StateError> {
        self.require_mut(id)?.reverse = reverse;
        Ok(())
    }

    /// Replaces the active bounds; the original bounds are kept for reset.
    pub fn apply_range(&mut self, id: &str, min: f64, max: f64) -> Result<(), StateError> {
        let checked = checked_range(min, max)?;
        let state = self.require_mut(id)?;
        state.range.min = checked.min;
        state.range.max = checked.max;
        debug!(layer = id, min, max, "value range applied");
        Ok(())
    }

    /// Restores the data-derived bounds.
    pub fn reset_range(&mut self, id: &str) -> Result<(), StateError> {
        self.require_mut(id)?.range.reset();
        Ok(())
    }

    /// Regenerates category colors with another palette.
    pub fn set_palette(&mut self, id: &str, palette_name: &str) -> Result<(), StateError> {
        let max_preset = self.defaults.max_preset_categories;
        let state = self.require_mut(id)?;
        if state.classification.is_numeric() {
            return Err(StateError::NotCategorical(id.to_string()));
        }
        state.palette = generate_category_colors(&state.categories, palette_name, max_preset);
        state.palette_name = palette_name.to_string();
        debug!(layer = id, palette = %state.palette.kind(), "palette changed");
        Ok(())
    }

    /// Switches the property of an active vector layer and reclassifies.
    ///
    /// The descriptor is taken explicitly so palette and colormap defaults
    /// are always available at this point. Opacity, reverse and the chosen
    /// palette carry over.
    pub fn set_property(
        &mut self,
        layer: &LayerDescriptor,
        features: &[Feature],
        property: &str,
    ) -> Result<&LayerRuntimeState, StateError> {
        expect_kind(layer, LayerKind::Vector)?;
        let previous = self
            .states
            .get(&layer.id)
            .ok_or_else(|| StateError::NotActive(layer.id.clone()))?;
        let opacity = previous.opacity;
        let reverse = previous.reverse;
        let palette_name = previous.palette_name.clone();

        let mut state =
            self.classify_vector(layer, features, property.to_string(), palette_name);
        state.opacity = opacity;
        state.reverse = reverse;
        self.states.insert(layer.id.clone(), state);
        self.require(&layer.id)
    }

    fn classify_vector(
        &self,
        layer: &LayerDescriptor,
        features: &[Feature],
        property: String,
        palette_name: String,
    ) -> LayerRuntimeState {
        let classification =
            detect_property_type(features, &property, self.defaults.feature_sample_size);

        let (range, categories, palette) = match classification {
            Classification::Numeric => (
                property_range(features, &property),
                Vec::new(),
                CategoryPalette::default(),
            ),
            Classification::Categorical(_) => {
                let categories = extract_categories(features, &property);
                let palette = generate_category_colors(
                    &categories,
                    &palette_name,
                    self.defaults.max_preset_categories,
                );
                (ValueRange::default(), categories, palette)
            }
        };

        LayerRuntimeState {
            kind: LayerKind::Vector,
            property: Some(property),
            classification,
            range,
            colormap: self.descriptor_colormap(layer),
            categories,
            palette_name,
            palette,
            opacity: self.descriptor_opacity(layer),
            reverse: false,
        }
    }

    /// A layer's `defaultColormap` may name a colormap or a category
    /// palette; the two are told apart by name.
    fn descriptor_colormap(&self, layer: &LayerDescriptor) -> Colormap {
        match layer.default_colormap.as_deref() {
            Some(name) if name.parse::<PresetPalette>().is_ok() => self.defaults.colormap,
            Some(name) => name.parse().unwrap_or_else(|e| {
                warn!(layer = %layer.id, error = %e, "falling back to default colormap");
                self.defaults.colormap
            }),
            None => self.defaults.colormap,
        }
    }

    fn descriptor_palette(&self, layer: &LayerDescriptor) -> String {
        match layer.default_colormap.as_deref() {
            Some(name) if name.parse::<PresetPalette>().is_ok() => name.trim().to_string(),
            _ => self.defaults.palette.clone(),
        }
    }

    fn descriptor_opacity(&self, layer: &LayerDescriptor) -> f64 {
        layer
            .default_opacity
            .filter(|o| o.is_finite())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(self.defaults.opacity)
    }

    fn count_of(&self, kind: LayerKind) -> usize {
        self.states.values().filter(|s| s.kind == kind).count()
    }

    fn insert(&mut self, id: String, state: LayerRuntimeState) {
        self.active.push(id.clone());
        self.states.insert(id, state);
    }

    fn require(&self, id: &str) -> Result<&LayerRuntimeState, StateError> {
        self.states
            .get(id)
            .ok_or_else(|| StateError::NotActive(id.to_string()))
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut LayerRuntimeState, StateError> {
        self.states
            .get_mut(id)
            .ok_or_else(|| StateError::NotActive(id.to_string()))
    }
}

fn expect_kind(layer: &LayerDescriptor, expected: LayerKind) -> Result<(), StateError> {
    if layer.kind == expected {
        Ok(())
    } else {
        Err(StateError::KindMismatch {
            id: layer.id.clone(),
            expected,
            found: layer.kind,
        })
    }
}

fn checked_range(min: f64, max: f64) -> Result<ValueRange, StateError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(ValueRange::new(min, max))
    } else {
        Err(StateError::InvalidRange { min, max })
    }
}
