//! Value to display style.
//!
//! Everything here is a pure function of its arguments.

use serde_json::Value;

use super::classify::ValueRange;
use super::color::Rgb;
use super::colormap::Colormap;
use super::palette::CategoryPalette;
use super::value::{category_label, numeric_value};

/// Fill used for missing, null or unparseable values.
pub const NO_DATA_COLOR: Rgb = Rgb::from_u32(0xcccccc);
pub const NO_DATA_FILL_OPACITY: f64 = 0.4;

/// Feature outline.
pub const STROKE_COLOR: Rgb = Rgb::from_u32(0x666666);
pub const STROKE_WEIGHT: f64 = 1.0;

/// Fill opacity of a colored value relative to the layer opacity.
pub const FILL_OPACITY_FACTOR: f64 = 0.7;

/// How a layer turns values into colors.
#[derive(Debug, Clone, Copy)]
pub enum ColorRule<'a> {
    Numeric {
        range: &'a ValueRange,
        colormap: Colormap,
        reverse: bool,
    },
    Categorical {
        palette: &'a CategoryPalette,
    },
}

/// Fill and stroke for one feature or pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill: Rgb,
    pub fill_opacity: f64,
    pub stroke: Rgb,
    pub weight: f64,
    pub opacity: f64,
    /// True when the neutral no-data fill was used.
    pub no_data: bool,
}

impl FeatureStyle {
    fn colored(fill: Rgb, opacity: f64) -> Self {
        Self {
            fill,
            fill_opacity: FILL_OPACITY_FACTOR * opacity,
            stroke: STROKE_COLOR,
            weight: STROKE_WEIGHT,
            opacity,
            no_data: false,
        }
    }

    /// Neutral style, independent of classification.
    pub fn no_data(opacity: f64) -> Self {
        Self {
            fill: NO_DATA_COLOR,
            fill_opacity: NO_DATA_FILL_OPACITY,
            stroke: STROKE_COLOR,
            weight: STROKE_WEIGHT,
            opacity,
            no_data: true,
        }
    }
}

/// Maps a number onto a colormap.
///
/// The value is normalized against the range and clamped, so anything
/// below `min` or above `max` lands on the 0 or 1 end. The reverse flag is
/// applied after clamping, so out-of-range values take the reversed
/// endpoint.
pub fn numeric_color(value: f64, range: &ValueRange, colormap: Colormap, reverse: bool) -> Rgb {
    let normalized = range.normalize(value);
    let position = if reverse {
        1.0 - normalized
    } else {
        normalized
    };
    colormap.evaluate(position)
}

/// Style for a raw property value.
pub fn style_value(value: Option<&Value>, rule: ColorRule<'_>, opacity: f64) -> FeatureStyle {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return FeatureStyle::no_data(opacity);
    };

    match rule {
        ColorRule::Numeric { .. } => style_number(numeric_value(value), rule, opacity),
        ColorRule::Categorical { palette } => {
            let fill = palette
                .color_for(&category_label(value))
                .unwrap_or(NO_DATA_COLOR);
            FeatureStyle::colored(fill, opacity)
        }
    }
}

/// Style for an already-numeric sample such as a raster pixel.
///
/// A categorical rule matches on the number's text form.
pub fn style_number(value: Option<f64>, rule: ColorRule<'_>, opacity: f64) -> FeatureStyle {
    let Some(value) = value.filter(|v| !v.is_nan()) else {
        return FeatureStyle::no_data(opacity);
    };

    match rule {
        ColorRule::Numeric {
            range,
            colormap,
            reverse,
        } => FeatureStyle::colored(numeric_color(value, range, colormap, reverse), opacity),
        ColorRule::Categorical { palette } => {
            let label = super::value::format_number(value);
            let fill = palette.color_for(&label).unwrap_or(NO_DATA_COLOR);
            FeatureStyle::colored(fill, opacity)
        }
    }
}

/// Evenly sampled colors for a color bar, low end first.
pub fn colorbar(colormap: Colormap, reverse: bool, steps: usize) -> Vec<Rgb> {
    if steps == 0 {
        return Vec::new();
    }
    let last = (steps - 1).max(1) as f64;
    (0..steps)
        .map(|i| {
            let t = i as f64 / last;
            colormap.evaluate(if reverse { 1.0 - t } else { t })
        })
        .collect()
}

/// Category legend entries sorted by label.
pub fn category_legend(palette: &CategoryPalette) -> Vec<(String, Rgb)> {
    let mut entries = palette.entries().to_vec();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
