//! Integration tests for the query session.
//!
//! These tests drive complete queries through the public API:
//! - Config and layer list loaded from disk, content found on the filesystem
//! - Raster and vector layers contributing samples, matches and candidates
//! - A newer query superseding one whose probes are still running
//!
//! Run with: `cargo test --test query_session_integration`

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use mapprobe::config::ConfigFile;
use mapprobe::content::{
    CancelReason, ContentProbe, FallbackKind, FsProbe, ProbeError, SlotOutcome, TabSlot,
};
use mapprobe::layer::{DisplayMode, LocationCodeType};
use mapprobe::query::{Command, CommandOutcome, LayerData, QueryInput, QuerySession, SampleValue};

// ============================================================================
// Mock Implementations
// ============================================================================

/// Probe that answers after a fixed delay, finding only the listed URLs.
#[derive(Clone)]
struct SlowProbe {
    found: Arc<HashSet<String>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl SlowProbe {
    fn new(found: &[&str], delay: Duration) -> Self {
        Self {
            found: Arc::new(found.iter().map(|u| u.to_string()).collect()),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ContentProbe for SlowProbe {
    async fn probe(&self, url: &str, _mode: DisplayMode) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.found.contains(url) {
            Ok(())
        } else {
            Err(ProbeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const TOKYO: (f64, f64) = (35.681236, 139.767125);
const TOKYO_MESH: &str = "53394611";
const OSAKA: (f64, f64) = (34.6937, 135.5023);
const OSAKA_MESH: &str = "52350430";

const LAYERS: &str = r#"{"layers": [
    {"id": "temp", "type": "raster", "name": "Temperature",
     "locationCode": {"type": "meshCode"},
     "paths": {"basedir": "temp/", "idBasedir": "sites/"}},
    {"id": "zones", "type": "vector", "name": "Zones", "propertyField": "zone",
     "locationCode": {"type": "meshCode"}, "displayMode": "embedded",
     "paths": {"baseUrl": "zones/"}}
]}"#;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn load_config(root: &Path) -> ConfigFile {
    write_file(root, "layers.json", LAYERS);
    write_file(
        root,
        "config.ini",
        &format!(
            "[layers]\nregistry = {}\n\n[location_codes]\ndefault_type = worldGrid\n\n[detail_panel]\nload_timeout_ms = 2000\n",
            root.join("layers.json").display()
        ),
    );
    ConfigFile::load_from(&root.join("config.ini")).unwrap()
}

fn zone_square() -> geojson::Feature {
    serde_json::from_value(json!({
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[
            [139.5, 35.5], [140.0, 35.5], [140.0, 36.0], [139.5, 36.0], [139.5, 35.5]
        ]]},
        "properties": {"zone": "commercial"}
    }))
    .unwrap()
}

fn raster_on(layer_id: &str) -> Command {
    Command::LayerActivated {
        layer_id: layer_id.to_string(),
        data: LayerData::Raster {
            min: -10.0,
            max: 40.0,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_query_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let config = load_config(root);

    write_file(root, &format!("temp/{}_1.png", TOKYO_MESH), "png");
    write_file(root, &format!("temp/{}_2.png", TOKYO_MESH), "png");

    let context = config.query_context(config.load_registry().unwrap());
    let mut session = QuerySession::new(context, FsProbe::new(root));
    assert_eq!(
        session.handle(raster_on("temp")).await.unwrap(),
        CommandOutcome::LayerActivated(true)
    );

    let input = QueryInput::at(TOKYO.0, TOKYO.1).with_sample("temp", SampleValue::number(21.5));
    let outcome = session.query(input).await.unwrap();

    assert_eq!(outcome.info.code_type, LocationCodeType::MeshCode);
    assert_eq!(
        outcome.info.codes.mesh_code.as_ref().map(|c| c.to_string()),
        Some(TOKYO_MESH.to_string())
    );
    assert!(!outcome.info.sample("temp").unwrap().style.no_data);

    match outcome.outcome(TabSlot::FIRST) {
        Some(SlotOutcome::Found(content)) => {
            assert_eq!(content.url, format!("temp/{}_1.png", TOKYO_MESH));
            assert_eq!(content.layer_id, "temp");
            assert_eq!(content.title, "Temperature");
        }
        other => panic!("slot 1 should be found, got {:?}", other),
    }
    assert!(outcome.outcome(TabSlot::SECOND).unwrap().is_found());
    assert_eq!(
        outcome.outcome(TabSlot::THIRD),
        Some(&SlotOutcome::Fallback {
            asset: config.detail_panel.fallback_image.clone(),
            kind: FallbackKind::NotFound,
        }),
        "slot 3 has no content on disk"
    );

    let describe = outcome.info.describe();
    assert!(describe.iter().any(|line| line.contains(TOKYO_MESH)));
}

#[tokio::test]
async fn test_vector_layer_takes_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let config = load_config(root);

    write_file(root, &format!("temp/{}_1.png", TOKYO_MESH), "png");
    write_file(root, &format!("zones/{}_1.html", TOKYO_MESH), "<p>zone</p>");

    let context = config.query_context(config.load_registry().unwrap());
    let mut session = QuerySession::new(context, FsProbe::new(root));
    session.handle(raster_on("temp")).await.unwrap();
    session
        .handle(Command::LayerActivated {
            layer_id: "zones".to_string(),
            data: LayerData::Vector(vec![zone_square()]),
        })
        .await
        .unwrap();

    let input = QueryInput::at(TOKYO.0, TOKYO.1).with_sample("temp", SampleValue::number(12.0));
    let outcome = session.query(input).await.unwrap();

    let zone = outcome.info.sample("zones").expect("zone sample");
    assert_eq!(zone.value, SampleValue::Property(json!("commercial")));
    assert!(outcome.info.feature_match("zones").is_some());

    match outcome.outcome(TabSlot::FIRST) {
        Some(SlotOutcome::Found(content)) => {
            assert_eq!(content.layer_id, "zones", "most recently activated layer wins");
            assert_eq!(content.mode, DisplayMode::Embedded);
            assert_eq!(content.url, format!("zones/{}_1.html", TOKYO_MESH));
        }
        other => panic!("slot 1 should be found, got {:?}", other),
    }

    // Switching the zones layer off leaves the raster as the only candidate
    session
        .handle(Command::LayerDeactivated {
            layer_id: "zones".to_string(),
        })
        .await
        .unwrap();
    let input = QueryInput::at(TOKYO.0, TOKYO.1).with_sample("temp", SampleValue::number(12.0));
    let outcome = session.query(input).await.unwrap();
    assert_eq!(
        outcome.outcome(TabSlot::FIRST).map(SlotOutcome::url),
        Some(format!("temp/{}_1.png", TOKYO_MESH).as_str())
    );
}

#[tokio::test]
async fn test_explicit_id_uses_id_folder() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let config = load_config(root);
    write_file(root, "sites/station42_1.png", "png");

    let context = config.query_context(config.load_registry().unwrap());
    let mut session = QuerySession::new(context, FsProbe::new(root));
    session.handle(raster_on("temp")).await.unwrap();

    let input = QueryInput::at(TOKYO.0, TOKYO.1)
        .with_id("station42")
        .with_sample("temp", SampleValue::number(3.0));
    let outcome = session.query(input).await.unwrap();

    assert_eq!(
        outcome.outcome(TabSlot::FIRST).map(SlotOutcome::url),
        Some("sites/station42_1.png")
    );
}

#[tokio::test(start_paused = true)]
async fn test_newer_query_wins_race() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_config(temp_dir.path());

    let tokyo_url = format!("temp/{}_1.png", TOKYO_MESH);
    let osaka_url = format!("temp/{}_1.png", OSAKA_MESH);
    let probe = SlowProbe::new(&[&tokyo_url, &osaka_url], Duration::from_millis(500));
    let calls = Arc::clone(&probe.calls);

    let context = config.query_context(config.load_registry().unwrap());
    let mut session = QuerySession::new(context, probe);
    session.handle(raster_on("temp")).await.unwrap();

    let first = session
        .prepare(QueryInput::at(TOKYO.0, TOKYO.1).with_sample("temp", SampleValue::number(1.0)))
        .unwrap();
    let first_token = first.token().clone();
    let first = tokio::spawn(first.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(calls.load(Ordering::SeqCst) > 0, "first query should be probing");

    let second = session
        .prepare(QueryInput::at(OSAKA.0, OSAKA.1).with_sample("temp", SampleValue::number(2.0)))
        .unwrap();
    assert_eq!(first_token.reason(), Some(CancelReason::Superseded));

    let second = second.run().await;
    let first = first.await.unwrap();

    assert!(first.is_cancelled(), "superseded query must not complete any slot");
    assert_eq!(
        second.outcome(TabSlot::FIRST).map(SlotOutcome::url),
        Some(osaka_url.as_str())
    );

    let board = session.resolver().results().snapshot();
    assert!(
        board.iter().all(|(_, outcome)| outcome.url() != tokyo_url),
        "stale content must never reach the result board"
    );
    assert_eq!(session.resolver().registry().len(), 0, "no probes left in flight");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_then_query_again() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_config(temp_dir.path());

    let url = format!("temp/{}_1.png", TOKYO_MESH);
    let probe = SlowProbe::new(&[&url], Duration::from_millis(300));

    let context = config.query_context(config.load_registry().unwrap());
    let mut session = QuerySession::new(context, probe);
    session.handle(raster_on("temp")).await.unwrap();

    let input = QueryInput::at(TOKYO.0, TOKYO.1).with_sample("temp", SampleValue::number(1.0));
    let running = tokio::spawn(session.prepare(input.clone()).unwrap().run());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        session.handle(Command::Cancel).await.unwrap(),
        CommandOutcome::Cancelled(true)
    );
    assert!(running.await.unwrap().is_cancelled());

    let outcome = session.query(input).await.unwrap();
    assert_eq!(
        outcome.outcome(TabSlot::FIRST).map(SlotOutcome::url),
        Some(url.as_str())
    );
}
