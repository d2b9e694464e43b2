//! Value presentation
//!
//! Classifies layer properties as numeric or categorical and turns sampled
//! values into display colors under a range, colormap and palette policy.
//!
//! # Example
//!
//! ```
//! use mapprobe::style::{numeric_color, Colormap, ValueRange};
//!
//! let range = ValueRange::new(0.0, 100.0);
//! let low = numeric_color(-20.0, &range, Colormap::Viridis, false);
//! assert_eq!(low, Colormap::Viridis.evaluate(0.0));
//! ```

mod classify;
mod color;
mod colormap;
mod palette;
mod render;
mod value;

pub use classify::{
    classify_properties, default_property, detect_property_type, extract_categories,
    numeric_properties, property_names, property_range, Classification, PropertyClasses,
    ValueRange, DEFAULT_FEATURE_SAMPLE_SIZE, RANGE_PAD,
};
pub use color::Rgb;
pub use colormap::{Colormap, UnknownColormap};
pub use palette::{
    generate_category_colors, CategoryPalette, PaletteKind, PresetPalette,
    DEFAULT_MAX_PRESET_CATEGORIES,
};
pub use render::{
    category_legend, colorbar, numeric_color, style_number, style_value, ColorRule,
    FeatureStyle, FILL_OPACITY_FACTOR, NO_DATA_COLOR, NO_DATA_FILL_OPACITY, STROKE_COLOR,
    STROKE_WEIGHT,
};
pub use value::{category_label, format_number, is_lossless_numeric, numeric_value};
