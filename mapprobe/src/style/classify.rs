//! Property classification for vector layers.
//!
//! Type detection only looks at a bounded prefix of the features, so a
//! property whose sampled values are all numeric is treated as numeric even
//! if a later feature holds text.

use geojson::Feature;
use serde_json::Value;

use super::value::{category_label, is_absent, is_lossless_numeric, numeric_value};

/// Number of leading features inspected by type detection.
pub const DEFAULT_FEATURE_SAMPLE_SIZE: usize = 20;

/// Amount added on each side of a degenerate (min == max) range.
pub const RANGE_PAD: f64 = 0.1;

/// Numeric vs categorical treatment of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Numeric,
    /// Distinct non-numeric values seen in the sample, first-seen order.
    Categorical(Vec<String>),
}

impl Classification {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Classification::Numeric)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Numeric => "numeric",
            Classification::Categorical(_) => "categorical",
        }
    }
}

/// Property names split by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyClasses {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl PropertyClasses {
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }
}

/// Value range of a numeric property.
///
/// `min`/`max` are the active bounds; the `original_*` bounds are what the
/// data produced and are restored by [`ValueRange::reset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub original_min: f64,
    pub original_max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            original_min: min,
            original_max: max,
        }
    }

    /// Restores the data-derived bounds.
    pub fn reset(&mut self) {
        self.min = self.original_min;
        self.max = self.original_max;
    }

    /// Position of `value` within the active bounds, clamped to 0..=1.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else if value > self.max {
            1.0
        } else {
            0.0
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

fn property<'a>(feature: &'a Feature, name: &str) -> Option<&'a Value> {
    feature.properties.as_ref().and_then(|props| props.get(name))
}

fn present<'a>(feature: &'a Feature, name: &str) -> Option<&'a Value> {
    property(feature, name).filter(|v| !is_absent(Some(v)))
}

/// Detects whether `name` is numeric over the first `sample_size` features.
///
/// Absent (missing or null) values are skipped. A property with no present
/// values in the sample is numeric.
pub fn detect_property_type(features: &[Feature], name: &str, sample_size: usize) -> Classification {
    let mut categories: Vec<String> = Vec::new();
    let mut numeric = true;

    for feature in features.iter().take(sample_size) {
        let Some(value) = present(feature, name) else {
            continue;
        };
        if is_lossless_numeric(value) {
            continue;
        }
        numeric = false;
        let label = category_label(value);
        if !categories.contains(&label) {
            categories.push(label);
        }
    }

    if numeric {
        Classification::Numeric
    } else {
        Classification::Categorical(categories)
    }
}

/// All property names in first-seen order.
pub fn property_names(features: &[Feature]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for props in features.iter().filter_map(|f| f.properties.as_ref()) {
        for key in props.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }
    names
}

/// Classifies every property found on any feature.
pub fn classify_properties(features: &[Feature], sample_size: usize) -> PropertyClasses {
    let mut classes = PropertyClasses::default();
    for name in property_names(features) {
        match detect_property_type(features, &name, sample_size) {
            Classification::Numeric => classes.numeric.push(name),
            Classification::Categorical(_) => classes.categorical.push(name),
        }
    }
    classes
}

/// Properties whose first sampled occurrence reads as a number.
///
/// Looser than [`detect_property_type`]: strings only need a numeric
/// prefix, and only the first occurrence of each property is examined.
pub fn numeric_properties(features: &[Feature], sample_size: usize) -> Vec<String> {
    let mut checked: Vec<&str> = Vec::new();
    let mut numeric = Vec::new();

    for props in features
        .iter()
        .take(sample_size)
        .filter_map(|f| f.properties.as_ref())
    {
        for (key, value) in props {
            if checked.contains(&key.as_str()) {
                continue;
            }
            checked.push(key);
            let looks_numeric = match value {
                Value::Number(_) => true,
                Value::String(_) => numeric_value(value).is_some(),
                _ => false,
            };
            if looks_numeric {
                numeric.push(key.clone());
            }
        }
    }
    numeric
}

/// First numeric-looking property, used when a layer names none.
pub fn default_property(features: &[Feature], sample_size: usize) -> Option<String> {
    numeric_properties(features, sample_size).into_iter().next()
}

/// Distinct present values of `name` across all features, first-seen order.
pub fn extract_categories(features: &[Feature], name: &str) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for feature in features {
        if let Some(value) = present(feature, name) {
            let label = category_label(value);
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
    }
    categories
}

/// Min/max of the numeric readings of `name` across all features.
///
/// Falls back to `[0, 1]` when nothing parses and pads a single-valued
/// range by [`RANGE_PAD`] on each side.
pub fn property_range(features: &[Feature], name: &str) -> ValueRange {
    let mut bounds: Option<(f64, f64)> = None;
    for value in features.iter().filter_map(|f| property(f, name)) {
        let Some(v) = numeric_value(value).filter(|v| v.is_finite()) else {
            continue;
        };
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }

    match bounds {
        None => ValueRange::new(0.0, 1.0),
        Some((lo, hi)) if lo == hi => ValueRange::new(lo - RANGE_PAD, hi + RANGE_PAD),
        Some((lo, hi)) => ValueRange::new(lo, hi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(props: Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: props.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn features(values: Vec<Value>, name: &str) -> Vec<Feature> {
        values
            .into_iter()
            .map(|v| feature(json!({ name: v })))
            .collect()
    }

    #[test]
    fn test_numbers_and_numeric_strings_are_numeric() {
        let fs = features(vec![json!(1), json!("2.5"), json!(-3)], "depth");
        assert_eq!(
            detect_property_type(&fs, "depth", DEFAULT_FEATURE_SAMPLE_SIZE),
            Classification::Numeric
        );
    }

    #[test]
    fn test_text_makes_property_categorical() {
        let fs = features(
            vec![json!("forest"), json!(3), json!("water"), json!("forest")],
            "landuse",
        );
        assert_eq!(
            detect_property_type(&fs, "landuse", DEFAULT_FEATURE_SAMPLE_SIZE),
            Classification::Categorical(vec!["forest".into(), "water".into()])
        );
    }

    #[test]
    fn test_non_canonical_numeric_string_is_categorical() {
        let fs = features(vec![json!("1.50")], "v");
        assert!(!detect_property_type(&fs, "v", 20).is_numeric());
    }

    #[test]
    fn test_unsampled_text_is_not_seen() {
        let mut values: Vec<Value> = (0..20).map(|i| json!(i.to_string())).collect();
        values.push(json!("not a number"));
        let fs = features(values, "v");
        assert_eq!(
            detect_property_type(&fs, "v", 20),
            Classification::Numeric,
            "only the first 20 features are sampled"
        );
        assert!(!detect_property_type(&fs, "v", 21).is_numeric());
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let fs = vec![
            feature(json!({ "v": null })),
            feature(json!({ "other": "x" })),
            feature(json!({ "v": 4 })),
        ];
        assert!(detect_property_type(&fs, "v", 20).is_numeric());
    }

    #[test]
    fn test_classify_properties() {
        let fs = vec![
            feature(json!({ "name": "a", "height": 10 })),
            feature(json!({ "name": "b", "height": "12", "kind": "road" })),
        ];
        let classes = classify_properties(&fs, 20);
        assert_eq!(classes.numeric, vec!["height".to_string()]);
        assert_eq!(classes.categorical, vec!["name".to_string(), "kind".to_string()]);
    }

    #[test]
    fn test_default_property_uses_loose_parse() {
        let fs = vec![feature(json!({ "name": "site", "depth": "12 m" }))];
        assert_eq!(default_property(&fs, 20), Some("depth".to_string()));
    }

    #[test]
    fn test_default_property_none() {
        let fs = vec![feature(json!({ "name": "site" }))];
        assert_eq!(default_property(&fs, 20), None);
    }

    #[test]
    fn test_extract_categories_scans_everything() {
        let mut values: Vec<Value> = (0..25).map(|_| json!("a")).collect();
        values.push(json!("z"));
        values.push(Value::Null);
        let fs = features(values, "c");
        assert_eq!(extract_categories(&fs, "c"), vec!["a".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_property_range() {
        let fs = features(vec![json!(5), json!("-2"), json!("n/a"), json!(9.5)], "v");
        let range = property_range(&fs, "v");
        assert_eq!(range.min, -2.0);
        assert_eq!(range.max, 9.5);
        assert_eq!(range.original_min, -2.0);
        assert_eq!(range.original_max, 9.5);
    }

    #[test]
    fn test_property_range_without_values_defaults_to_unit() {
        let fs = features(vec![json!("n/a")], "v");
        assert_eq!(property_range(&fs, "v"), ValueRange::new(0.0, 1.0));
    }

    #[test]
    fn test_property_range_single_value_is_padded() {
        let fs = features(vec![json!(3), json!(3)], "v");
        let range = property_range(&fs, "v");
        assert!((range.min - 2.9).abs() < 1e-12);
        assert!((range.max - 3.1).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_clamps() {
        let range = ValueRange::new(10.0, 20.0);
        assert_eq!(range.normalize(15.0), 0.5);
        assert_eq!(range.normalize(-100.0), 0.0);
        assert_eq!(range.normalize(100.0), 1.0);
    }

    #[test]
    fn test_reset_restores_original() {
        let mut range = ValueRange::new(0.0, 100.0);
        range.min = 20.0;
        range.max = 40.0;
        range.reset();
        assert_eq!(range, ValueRange::new(0.0, 100.0));
    }
}
