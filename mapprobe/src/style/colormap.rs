//! Named continuous colormaps.
//!
//! Each map is a table of `(position, color)` anchors sorted by position;
//! colors between anchors are linearly interpolated.

use std::fmt;
use std::str::FromStr;

use super::color::Rgb;

/// Error returned for an unknown colormap name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown colormap: {0}")]
pub struct UnknownColormap(pub String);

/// Colormaps selectable for numeric layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Colormap {
    Spectral,
    Gnuplot2,
    RdYlGn,
    RdYlBu,
    #[default]
    Viridis,
    Jet,
    Ocean,
    NipySpectral,
    Terrain,
    Binary,
    Reds,
    Blues,
    Greens,
    RdBu,
    PRGn,
}

type Anchor = (f64, u32);

const SPECTRAL: &[u32] = &[
    0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
    0x3288bd, 0x5e4fa2,
];

const RD_YL_GN: &[u32] = &[
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63,
    0x1a9850, 0x006837,
];

const RD_YL_BU: &[u32] = &[
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
    0x4575b4, 0x313695,
];

const RD_BU: &[u32] = &[
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
    0x2166ac, 0x053061,
];

const PR_GN: &[u32] = &[
    0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0, 0x5aae61,
    0x1b7837, 0x00441b,
];

const REDS: &[u32] = &[
    0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d,
];

const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];

const GREENS: &[u32] = &[
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];

const JET: &[u32] = &[
    0x00007f, 0x0000ff, 0x007fff, 0x00ffff, 0x7fff7f, 0xffff00, 0xff7f00, 0xff0000, 0x7f0000,
];

const VIRIDIS: &[Anchor] = &[
    (0.0 / 9.0, 0x440154),
    (1.0 / 9.0, 0x482878),
    (2.0 / 9.0, 0x3e4a89),
    (3.0 / 9.0, 0x31688e),
    (4.0 / 9.0, 0x26828e),
    (5.0 / 9.0, 0x1f9e89),
    (6.0 / 9.0, 0x35b779),
    (7.0 / 9.0, 0x6dcd59),
    (8.0 / 9.0, 0xb4de2c),
    (1.0, 0xfde725),
];

const GNUPLOT2: &[Anchor] = &[
    (0.0, 0x000000),
    (0.25, 0x0000ff),
    (0.42, 0x8700ff),
    (0.57, 0xff4cb3),
    (0.92, 0xffff00),
    (1.0, 0xffffff),
];

const OCEAN: &[Anchor] = &[
    (0.0, 0x007f00),
    (1.0 / 3.0, 0x000055),
    (2.0 / 3.0, 0x007faa),
    (1.0, 0xffffff),
];

const NIPY_SPECTRAL: &[Anchor] = &[
    (0.00, 0x000000),
    (0.05, 0x770088),
    (0.10, 0x880099),
    (0.15, 0x0000aa),
    (0.20, 0x0000dd),
    (0.25, 0x0077dd),
    (0.30, 0x0099dd),
    (0.35, 0x00aaaa),
    (0.40, 0x00aa88),
    (0.45, 0x009900),
    (0.50, 0x00bb00),
    (0.55, 0x00dd00),
    (0.60, 0x00ff00),
    (0.65, 0xbbff00),
    (0.70, 0xeeee00),
    (0.75, 0xffcc00),
    (0.80, 0xff9900),
    (0.85, 0xff0000),
    (0.90, 0xdd0000),
    (0.95, 0xcc0000),
    (1.00, 0xcccccc),
];

const TERRAIN: &[Anchor] = &[
    (0.0, 0x333399),
    (0.15, 0x0099ff),
    (0.25, 0x00cc66),
    (0.5, 0xffff99),
    (0.75, 0x805c54),
    (1.0, 0xffffff),
];

const BINARY: &[Anchor] = &[(0.0, 0xffffff), (1.0, 0x000000)];

/// Anchor table of a colormap.
#[derive(Debug, Clone, Copy)]
enum Stops {
    /// Colors spread evenly over 0..=1.
    Even(&'static [u32]),
    /// Colors at explicit positions.
    At(&'static [Anchor]),
}

impl Stops {
    fn len(self) -> usize {
        match self {
            Stops::Even(colors) => colors.len(),
            Stops::At(anchors) => anchors.len(),
        }
    }

    fn get(self, i: usize) -> Anchor {
        match self {
            Stops::Even(colors) => (i as f64 / (colors.len() - 1) as f64, colors[i]),
            Stops::At(anchors) => anchors[i],
        }
    }
}

impl Colormap {
    /// Every colormap in menu order.
    pub const ALL: [Colormap; 15] = [
        Colormap::Spectral,
        Colormap::Gnuplot2,
        Colormap::RdYlGn,
        Colormap::RdYlBu,
        Colormap::Viridis,
        Colormap::Jet,
        Colormap::Ocean,
        Colormap::NipySpectral,
        Colormap::Terrain,
        Colormap::Binary,
        Colormap::Reds,
        Colormap::Blues,
        Colormap::Greens,
        Colormap::RdBu,
        Colormap::PRGn,
    ];

    /// Canonical name as written in layer configuration.
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Spectral => "Spectral",
            Colormap::Gnuplot2 => "gnuplot2",
            Colormap::RdYlGn => "RdYlGn",
            Colormap::RdYlBu => "RdYlBu",
            Colormap::Viridis => "viridis",
            Colormap::Jet => "jet",
            Colormap::Ocean => "ocean",
            Colormap::NipySpectral => "nipy_spectral",
            Colormap::Terrain => "terrain",
            Colormap::Binary => "binary",
            Colormap::Reds => "Reds",
            Colormap::Blues => "Blues",
            Colormap::Greens => "Greens",
            Colormap::RdBu => "RdBu",
            Colormap::PRGn => "PRGn",
        }
    }

    fn stops(self) -> Stops {
        match self {
            Colormap::Spectral => Stops::Even(SPECTRAL),
            Colormap::Gnuplot2 => Stops::At(GNUPLOT2),
            Colormap::RdYlGn => Stops::Even(RD_YL_GN),
            Colormap::RdYlBu => Stops::Even(RD_YL_BU),
            Colormap::Viridis => Stops::At(VIRIDIS),
            Colormap::Jet => Stops::Even(JET),
            Colormap::Ocean => Stops::At(OCEAN),
            Colormap::NipySpectral => Stops::At(NIPY_SPECTRAL),
            Colormap::Terrain => Stops::At(TERRAIN),
            Colormap::Binary => Stops::At(BINARY),
            Colormap::Reds => Stops::Even(REDS),
            Colormap::Blues => Stops::Even(BLUES),
            Colormap::Greens => Stops::Even(GREENS),
            Colormap::RdBu => Stops::Even(RD_BU),
            Colormap::PRGn => Stops::Even(PR_GN),
        }
    }

    /// Evaluates the map at `position`, clamped to 0..=1.
    ///
    /// NaN evaluates to the 0 endpoint.
    pub fn evaluate(self, position: f64) -> Rgb {
        let stops = self.stops();
        let t = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };

        let (first_pos, first_color) = stops.get(0);
        if t <= first_pos {
            return Rgb::from_u32(first_color);
        }
        for i in 1..stops.len() {
            let (lo_pos, lo_color) = stops.get(i - 1);
            let (hi_pos, hi_color) = stops.get(i);
            if t <= hi_pos {
                let span = hi_pos - lo_pos;
                let local = if span > 0.0 { (t - lo_pos) / span } else { 1.0 };
                return Rgb::from_u32(lo_color).lerp(Rgb::from_u32(hi_color), local);
            }
        }
        Rgb::from_u32(stops.get(stops.len() - 1).1)
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = UnknownColormap;

    /// Matches canonical names exactly first, then case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|c| c.name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| UnknownColormap(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_parse_back() {
        for map in Colormap::ALL {
            assert_eq!(map.name().parse::<Colormap>().unwrap(), map);
        }
    }

    #[test]
    fn test_case_insensitive_fallback() {
        assert_eq!("Viridis".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert_eq!("rdylgn".parse::<Colormap>().unwrap(), Colormap::RdYlGn);
        assert!("magma".parse::<Colormap>().is_err());
    }

    #[test]
    fn test_endpoints_match_anchor_tables() {
        assert_eq!(Colormap::Viridis.evaluate(0.0), Rgb::from_u32(0x440154));
        assert_eq!(Colormap::Viridis.evaluate(1.0), Rgb::from_u32(0xfde725));
        assert_eq!(Colormap::Binary.evaluate(0.0), Rgb::new(255, 255, 255));
        assert_eq!(Colormap::Binary.evaluate(1.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_out_of_range_positions_clamp() {
        for map in Colormap::ALL {
            assert_eq!(map.evaluate(-3.0), map.evaluate(0.0), "{} low end", map);
            assert_eq!(map.evaluate(7.5), map.evaluate(1.0), "{} high end", map);
        }
    }

    #[test]
    fn test_interpolates_between_anchors() {
        assert_eq!(Colormap::Binary.evaluate(0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_anchor_tables_are_sorted_and_span_unit_interval() {
        for map in Colormap::ALL {
            let stops = map.stops();
            assert_eq!(stops.get(0).0, 0.0, "{} starts at 0", map);
            assert!(
                (stops.get(stops.len() - 1).0 - 1.0).abs() < 1e-12,
                "{} ends at 1",
                map
            );
            assert!(
                (1..stops.len()).all(|i| stops.get(i - 1).0 < stops.get(i).0),
                "{} anchors ascend",
                map
            );
        }
    }

    #[test]
    fn test_default_is_viridis() {
        assert_eq!(Colormap::default(), Colormap::Viridis);
    }
}
