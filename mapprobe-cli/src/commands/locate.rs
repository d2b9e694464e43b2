//! `mapprobe locate` - location codes for a coordinate.

use clap::Args;

use mapprobe::coord::{grid_indices, grid_key, mesh_code, parse_coordinates, Coordinate, MeshOrder};

use super::common::coordinate_text;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `locate`.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Coordinate text: "lat, lon", "lat lon" or compact "DD DDD"
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub coords: Vec<String>,

    /// World grid cell size in minutes (default: from config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub minutes: Option<u32>,
}

pub fn run(args: LocateArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("locate");

    let coordinate = parse_coordinates(&coordinate_text(&args.coords))?;
    let minutes = args
        .minutes
        .unwrap_or(runner.config().location_codes.grid_minutes);

    for line in describe(&coordinate, minutes) {
        println!("{}", line);
    }
    Ok(())
}

/// Report lines for a coordinate.
fn describe(coordinate: &Coordinate, minutes: u32) -> Vec<String> {
    let mut lines = vec![format!("Location: {:.6}, {:.6}", coordinate.lat, coordinate.lon)];

    lines.push("Mesh codes:".to_string());
    for order in MeshOrder::ALL {
        let code = mesh_code(coordinate.lat, coordinate.lon, order)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "out of range".to_string());
        lines.push(format!("  order {:<4} {}", order.as_f64(), code));
    }

    let key = grid_key(coordinate.lon, coordinate.lat, minutes)
        .unwrap_or_else(|| "out of range".to_string());
    lines.push(format!("World grid ({}'): {}", minutes, key));

    let index = grid_indices(coordinate.lat, coordinate.lon);
    lines.push(format!("Grid index: {}", index.id()));
    lines
}
