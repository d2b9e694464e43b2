//! `mapprobe classify` - property classification of a GeoJSON file.

use std::path::PathBuf;

use clap::Args;
use geojson::Feature;

use mapprobe::config::ConfigFile;
use mapprobe::style::{
    category_legend, classify_properties, colorbar, default_property, detect_property_type,
    extract_categories, generate_category_colors, property_range, Classification, Colormap,
};

use super::common::{parse_colormap, read_geojson};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Color bar stops printed for numeric properties.
const COLORBAR_STEPS: usize = 5;

/// Arguments for `classify`.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// GeoJSON file (Feature or FeatureCollection)
    pub geojson: PathBuf,

    /// Property to classify (default: first numeric, then first categorical)
    #[arg(long)]
    pub property: Option<String>,

    /// Category palette: colorful, pastel, dark (default: from config)
    #[arg(long)]
    pub palette: Option<String>,

    /// Colormap for numeric properties (default: from config)
    #[arg(long)]
    pub colormap: Option<String>,
}

pub fn run(args: ClassifyArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("classify");

    let features = read_geojson(&args.geojson)?;
    let lines = report(
        &features,
        args.property.as_deref(),
        args.palette.as_deref(),
        args.colormap.as_deref(),
        runner.config(),
    )?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn list(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Report lines for a feature set.
fn report(
    features: &[Feature],
    property: Option<&str>,
    palette: Option<&str>,
    colormap: Option<&str>,
    config: &ConfigFile,
) -> Result<Vec<String>, CliError> {
    let sample_size = config.vector.feature_sample_size;
    let classes = classify_properties(features, sample_size);
    let colormap: Colormap = parse_colormap(colormap, config.vector.default_colormap)?;
    let palette = palette.unwrap_or(&config.vector.default_palette);

    let mut lines = vec![
        format!("Features: {}", features.len()),
        format!("Numeric properties: {}", list(&classes.numeric)),
        format!("Categorical properties: {}", list(&classes.categorical)),
    ];

    let chosen = property
        .map(str::to_string)
        .or_else(|| default_property(features, sample_size))
        .or_else(|| classes.categorical.first().cloned());
    let Some(chosen) = chosen else {
        lines.push("No properties to classify".to_string());
        return Ok(lines);
    };

    let classification = detect_property_type(features, &chosen, sample_size);
    lines.push(format!("Property: {} ({})", chosen, classification.label()));

    match classification {
        Classification::Numeric => {
            let range = property_range(features, &chosen);
            lines.push(format!("Range: {} to {}", range.min, range.max));
            let stops: Vec<String> = colorbar(colormap, false, COLORBAR_STEPS)
                .into_iter()
                .map(|c| c.to_hex())
                .collect();
            lines.push(format!("Colormap {}: {}", colormap, stops.join(" ")));
        }
        Classification::Categorical(_) => {
            let categories = extract_categories(features, &chosen);
            let palette =
                generate_category_colors(&categories, palette, config.vector.max_preset_categories);
            lines.push(format!(
                "Palette: {} ({} categories)",
                palette.kind(),
                palette.len()
            ));
            for (category, color) in category_legend(&palette) {
                lines.push(format!("  {} {}", color, category));
            }
        }
    }
    Ok(lines)
}
