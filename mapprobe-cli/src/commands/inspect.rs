//! `mapprobe inspect` - run a full point query.
//!
//! Layers are activated in the order given, so the last `--activate` is the
//! current layer and its content is tried first.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use mapprobe::content::{ContentProbe, DefaultProbe, SlotOutcome, SlotResolution};
use mapprobe::coord::parse_coordinates;
use mapprobe::layer::LayerKind;
use mapprobe::query::{
    Command, CommandOutcome, LayerData, QueryInput, QueryOutcome, QuerySession, SampleValue,
};

use super::common::{coordinate_text, parse_assignment, parse_range, parse_sample, read_geojson};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Layer list JSON (default: [layers] registry from config)
    #[arg(long)]
    pub layers: Option<PathBuf>,

    /// Layer to switch on; repeat for several, last one is current
    #[arg(long = "activate", value_name = "ID")]
    pub activate: Vec<String>,

    /// Features for a vector layer
    #[arg(long = "geojson", value_name = "ID=PATH")]
    pub geojson: Vec<String>,

    /// Raster value at the point; `null` for no data
    #[arg(long = "sample", value_name = "ID=VALUE")]
    pub samples: Vec<String>,

    /// Value span of a raster layer
    #[arg(long = "range", value_name = "ID=MIN:MAX")]
    pub ranges: Vec<String>,

    /// Explicit location id, used as the content key
    #[arg(long)]
    pub id: Option<String>,

    /// Display name of the location
    #[arg(long)]
    pub name: Option<String>,

    /// Directory that relative content paths resolve against
    #[arg(long, default_value = ".")]
    pub content_root: PathBuf,

    /// Coordinate text: "lat, lon", "lat lon" or compact "DD DDD"
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub coords: Vec<String>,
}

/// Layer activation requests derived from the arguments.
#[derive(Debug, Default)]
struct LayerInputs {
    geojson: HashMap<String, PathBuf>,
    samples: HashMap<String, SampleValue>,
    ranges: HashMap<String, (f64, f64)>,
}

impl LayerInputs {
    fn parse(args: &InspectArgs) -> Result<Self, CliError> {
        let mut inputs = Self::default();
        for arg in &args.geojson {
            let (id, path) = parse_assignment(arg, "--geojson")?;
            inputs.geojson.insert(id.to_string(), PathBuf::from(path));
        }
        for arg in &args.samples {
            let (id, value) = parse_assignment(arg, "--sample")?;
            inputs.samples.insert(id.to_string(), parse_sample(value)?);
        }
        for arg in &args.ranges {
            let (id, range) = parse_assignment(arg, "--range")?;
            inputs.ranges.insert(id.to_string(), parse_range(range)?);
        }
        Ok(inputs)
    }

    /// Raster span: the given range, else the sample value itself, else 0..1.
    fn raster_range(&self, layer_id: &str) -> (f64, f64) {
        if let Some(range) = self.ranges.get(layer_id) {
            return *range;
        }
        match self.samples.get(layer_id).and_then(SampleValue::as_number) {
            Some(value) => (value, value),
            None => (0.0, 1.0),
        }
    }
}

pub async fn run(args: InspectArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("inspect");

    let coordinate = parse_coordinates(&coordinate_text(&args.coords))?;
    let inputs = LayerInputs::parse(&args)?;

    let registry = runner.registry(args.layers.as_deref())?;
    let context = runner.config().query_context(registry);
    let probe = DefaultProbe::new(&args.content_root)?;
    let mut session = QuerySession::new(context, probe);

    for layer_id in &args.activate {
        let data = layer_data(&session, layer_id, &inputs)?;
        match session
            .handle(Command::LayerActivated {
                layer_id: layer_id.clone(),
                data,
            })
            .await?
        {
            CommandOutcome::LayerActivated(true) => {}
            _ => println!("Layer '{}' is not in the layer list, skipped", layer_id),
        }
    }

    let mut input = QueryInput::at(coordinate.lat, coordinate.lon);
    input.raster_samples = inputs.samples;
    input.id = args.id;
    input.name = args.name;

    let outcome = session.query(input).await?;
    for line in render(&outcome) {
        println!("{}", line);
    }
    Ok(())
}

fn layer_data<P: ContentProbe>(
    session: &QuerySession<P>,
    layer_id: &str,
    inputs: &LayerInputs,
) -> Result<LayerData, CliError> {
    let kind = session
        .context()
        .registry()
        .get(layer_id)
        .map(|d| d.kind);

    match (kind, inputs.geojson.get(layer_id)) {
        (Some(LayerKind::Vector), Some(path)) => Ok(LayerData::Vector(read_geojson(path)?)),
        (Some(LayerKind::Vector), None) => Err(CliError::InvalidInput(format!(
            "vector layer '{}' needs --geojson {}=PATH",
            layer_id, layer_id
        ))),
        (_, Some(_)) => {
            warn!(layer = layer_id, "--geojson given for a layer that is not a vector layer");
            let (min, max) = inputs.raster_range(layer_id);
            Ok(LayerData::Raster { min, max })
        }
        (_, None) => {
            let (min, max) = inputs.raster_range(layer_id);
            Ok(LayerData::Raster { min, max })
        }
    }
}

/// Report lines for a finished query.
fn render(outcome: &QueryOutcome) -> Vec<String> {
    let mut lines = outcome.info.describe();

    for sample in &outcome.info.samples {
        let style = &sample.style;
        let fill = if style.no_data {
            "no data".to_string()
        } else {
            style.fill.to_hex()
        };
        lines.push(format!(
            "  {} fill {} (opacity {:.2})",
            sample.layer_id, fill, style.fill_opacity
        ));
    }

    for found in &outcome.info.matches {
        lines.push(format!(
            "Feature match: {} #{}",
            found.layer_id, found.feature_index
        ));
    }

    lines.push("Content:".to_string());
    for (slot, resolution) in &outcome.slots {
        let text = match resolution {
            SlotResolution::Completed(SlotOutcome::Found(content)) => {
                format!("{} [{}, {}]", content.url, content.layer_id, content.mode)
            }
            SlotResolution::Completed(SlotOutcome::Fallback { asset, kind }) => {
                format!("{} [fallback: {}]", asset, kind)
            }
            SlotResolution::Cancelled => "cancelled".to_string(),
        };
        lines.push(format!("  tab {}: {}", slot, text));
    }
    lines
}
