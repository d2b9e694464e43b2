//! Category palettes.
//!
//! Small category sets draw from a named preset cyclically in first-seen
//! order. Larger sets get an automatic hue spread instead.

use std::fmt;
use std::str::FromStr;

use super::color::Rgb;

/// Category count above which presets are abandoned for an auto palette.
pub const DEFAULT_MAX_PRESET_CATEGORIES: usize = 12;

/// Saturation and lightness of auto-generated category colors.
const AUTO_SATURATION: f64 = 0.70;
const AUTO_LIGHTNESS: f64 = 0.60;

const COLORFUL: [u32; 12] = [
    0xe41a1c, 0xeecc00, 0x4daf4a, 0x984ea3, 0xff7f00, 0xffff33, 0xa65628, 0xf781bf, 0x999999,
    0x66c2a5, 0xfc8d62, 0x8da0cb,
];

const PASTEL: [u32; 12] = [
    0x8dd3c7, 0xffffb3, 0xbebada, 0xfb8072, 0x80b1d3, 0xfdb462, 0xb3de69, 0xfccde5, 0xd9d9d9,
    0xbc80bd, 0xccebc5, 0xffed6f,
];

const DARK: [u32; 12] = [
    0x222222, 0xaaaaaa, 0x7570b3, 0xe7298a, 0x66a61e, 0xe6ab02, 0xa6761d, 0x666666, 0x3288bd,
    0x5e4fa2, 0x66c2a5, 0x5ab4ac,
];

/// Named preset palettes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PresetPalette {
    #[default]
    Colorful,
    Pastel,
    Dark,
}

impl PresetPalette {
    pub const ALL: [PresetPalette; 3] = [
        PresetPalette::Colorful,
        PresetPalette::Pastel,
        PresetPalette::Dark,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PresetPalette::Colorful => "colorful",
            PresetPalette::Pastel => "pastel",
            PresetPalette::Dark => "dark",
        }
    }

    pub fn colors(self) -> impl Iterator<Item = Rgb> + Clone {
        let table = match self {
            PresetPalette::Colorful => &COLORFUL,
            PresetPalette::Pastel => &PASTEL,
            PresetPalette::Dark => &DARK,
        };
        table.iter().copied().map(Rgb::from_u32)
    }

    /// Resolves a palette name, falling back to `colorful` for unknown names.
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for PresetPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetPalette {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// How a palette's colors were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Preset(PresetPalette),
    Auto,
}

impl fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteKind::Preset(preset) => write!(f, "{}", preset),
            PaletteKind::Auto => f.write_str("auto"),
        }
    }
}

/// Category to color assignment for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPalette {
    kind: PaletteKind,
    entries: Vec<(String, Rgb)>,
}

impl Default for CategoryPalette {
    /// Empty assignment, used while a layer is numeric.
    fn default() -> Self {
        Self {
            kind: PaletteKind::Preset(PresetPalette::default()),
            entries: Vec::new(),
        }
    }
}

impl CategoryPalette {
    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    /// Color assigned to a category, if any.
    pub fn color_for(&self, category: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, color)| *color)
    }

    /// Assignments in first-seen category order.
    pub fn entries(&self) -> &[(String, Rgb)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assigns colors to categories.
///
/// With at most `max_preset` categories the named preset (unknown names
/// fall back to `colorful`) is used cyclically. Otherwise hues are spread
/// evenly over 360° and the requested name is ignored.
pub fn generate_category_colors(
    categories: &[String],
    palette_name: &str,
    max_preset: usize,
) -> CategoryPalette {
    if categories.len() <= max_preset {
        let preset = PresetPalette::resolve(palette_name);
        let entries = categories
            .iter()
            .cloned()
            .zip(preset.colors().cycle())
            .collect();
        return CategoryPalette {
            kind: PaletteKind::Preset(preset),
            entries,
        };
    }

    let count = categories.len() as f64;
    let entries = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let hue = (i as f64 / count * 360.0).floor();
            (
                category.clone(),
                Rgb::from_hsl(hue, AUTO_SATURATION, AUTO_LIGHTNESS),
            )
        })
        .collect();

    CategoryPalette {
        kind: PaletteKind::Auto,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cat{}", i)).collect()
    }

    #[test]
    fn test_preset_assignment_in_first_seen_order() {
        let cats = vec!["forest".to_string(), "water".to_string(), "urban".to_string()];
        let palette = generate_category_colors(&cats, "colorful", DEFAULT_MAX_PRESET_CATEGORIES);

        assert_eq!(palette.kind(), PaletteKind::Preset(PresetPalette::Colorful));
        assert_eq!(palette.color_for("forest"), Rgb::from_hex("#e41a1c"));
        assert_eq!(palette.color_for("water"), Rgb::from_hex("#eecc00"));
        assert_eq!(palette.color_for("urban"), Rgb::from_hex("#4daf4a"));
        assert_eq!(palette.color_for("desert"), None);
    }

    #[test]
    fn test_unknown_palette_falls_back_to_colorful() {
        let palette = generate_category_colors(&categories(2), "viridis", 12);
        assert_eq!(palette.kind(), PaletteKind::Preset(PresetPalette::Colorful));
    }

    #[test]
    fn test_dark_palette() {
        let palette = generate_category_colors(&categories(2), "dark", 12);
        assert_eq!(palette.entries()[1].1, Rgb::from_hex("#aaaaaa").unwrap());
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        let palette = generate_category_colors(&categories(12), "pastel", 12);
        assert_eq!(palette.kind(), PaletteKind::Preset(PresetPalette::Pastel));
        assert_eq!(palette.len(), 12);
    }

    #[test]
    fn test_preset_cycles_when_ceiling_exceeds_table() {
        let palette = generate_category_colors(&categories(14), "colorful", 20);
        assert_eq!(palette.entries()[12].1, palette.entries()[0].1);
        assert_eq!(palette.entries()[13].1, palette.entries()[1].1);
    }

    #[test]
    fn test_auto_palette_above_ceiling() {
        let palette = generate_category_colors(&categories(13), "pastel", 12);
        assert_eq!(palette.kind(), PaletteKind::Auto);
        assert_eq!(palette.kind().to_string(), "auto");
        assert_eq!(palette.len(), 13);
        // Hue 0 at 70% saturation, 60% lightness
        assert_eq!(palette.entries()[0].1, Rgb::from_hsl(0.0, 0.7, 0.6));
        let distinct: std::collections::HashSet<_> =
            palette.entries().iter().map(|(_, c)| *c).collect();
        assert_eq!(distinct.len(), 13, "auto hues should not repeat");
    }

    #[test]
    fn test_assignment_is_stable() {
        let cats = categories(5);
        let first = generate_category_colors(&cats, "pastel", 12);
        let second = generate_category_colors(&cats, "pastel", 12);
        assert_eq!(first, second);
    }
}
