use siteplan_core::error::SnapshotError;
use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{
    DrawingMode, FeatureRef, Key, LayerKind, PlanningImage, PlanningSnapshot, Point,
    PointerInput, StaticPresetCatalog,
};
use tempfile::TempDir;

fn click(state: &mut DesignerState, x: f64, y: f64) {
    let screen = state.canvas.viewport().world_to_screen(Point::new(x, y));
    let p = PointerInput::primary(1, screen.x, screen.y);
    state.on_pointer_down(p);
    state.on_pointer_up(p);
}

/// Terrain rectangle, green field with a scatter assignment, a road extended
/// from its end, and a marked image.
fn populated_state() -> DesignerState {
    let mut state = DesignerState::new();
    let terrain = state.canvas.active_layer_id().to_string();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    for (x, y) in [(0.0, 0.0), (40.0, 0.0), (40.0, 30.0), (0.0, 30.0)] {
        click(&mut state, x, y);
    }
    state.on_key(Key::Enter);

    let green = state.add_layer(LayerKind::Green);
    state.set_active_layer(&green).unwrap();
    for (x, y) in [(50.0, 0.0), (80.0, 0.0), (80.0, 20.0)] {
        click(&mut state, x, y);
    }
    state.on_key(Key::Enter);
    let field = state.canvas.polygons()[1].id.clone();
    let tree = StaticPresetCatalog::default()
        .presets()
        .iter()
        .find(|p| p.category == "tree")
        .cloned()
        .unwrap();
    state
        .set_scatter(&FeatureRef::Polygon(field), Some(tree.assignment("oak-01")))
        .unwrap();

    let road = state.add_layer(LayerKind::Road);
    state.set_active_layer(&road).unwrap();
    state.set_mode(DrawingMode::Line).unwrap();
    for (x, y) in [(0.0, 50.0), (20.0, 50.0), (40.0, 50.0)] {
        click(&mut state, x, y);
    }
    state.on_key(Key::Enter);
    click(&mut state, 40.0, 50.0);
    click(&mut state, 40.0, 80.0);
    state.on_key(Key::Enter);

    let mut image = PlanningImage::new("plans/site.png", 200.0, 100.0);
    image.position = Point::new(-10.0, -5.0);
    image.scale = 0.5;
    image.opacity = 0.75;
    image.align_marker = Some(Point::new(20.0, 10.0));
    state.add_image(image);

    state.set_active_layer(&terrain).unwrap();
    state
        .canvas
        .viewport_mut()
        .restore(2.0, Point::new(3.5, -1.25));
    state
}

#[test]
fn test_snapshot_round_trip_is_lossless() {
    let mut state = populated_state();
    let snapshot = state.snapshot();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.layers.len(), 3);
    assert_eq!(snapshot.polygons.len(), 2);
    assert_eq!(snapshot.polylines.len(), 1);
    assert_eq!(snapshot.images.len(), 1);

    let json = snapshot.to_json().unwrap();
    let decoded = PlanningSnapshot::from_json(&json).unwrap();
    assert_eq!(decoded, snapshot);

    let mut restored = DesignerState::new();
    let report = restored.load_snapshot(&decoded).unwrap();
    assert_eq!(report.features, 4);
    assert_eq!(report.dropped, 0);
    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.canvas.viewport().scale(), 2.0);
    assert_eq!(restored.canvas.viewport().offset(), Point::new(3.5, -1.25));
}

#[test]
fn test_extended_road_keeps_vertex_ids() {
    let mut state = populated_state();
    let snapshot = state.snapshot();
    let road = &snapshot.polylines[0];
    assert_eq!(road.points.len(), 4);
    assert!(road.points.iter().all(|p| p.id.is_some()));

    let (canvas, _) = snapshot.to_canvas().unwrap();
    assert_eq!(canvas.vertices().len(), 4);
    let points = canvas.polyline_points(&canvas.polylines()[0]);
    assert_eq!(points[3], Point::new(40.0, 80.0));
}

#[test]
fn test_json_uses_camel_case_keys() {
    let mut state = populated_state();
    let json = state.snapshot().to_json().unwrap();
    for key in [
        "\"activeLayerId\"",
        "\"viewTransform\"",
        "\"layerId\"",
        "\"roadWidthMeters\"",
        "\"sizeLabel\"",
        "\"alignMarker\"",
        "\"densityPercent\"",
        "\"footprintAreaM2\"",
    ] {
        assert!(json.contains(key), "missing {}", key);
    }
}

#[test]
fn test_unsupported_version_leaves_model() {
    let mut state = populated_state();
    let mut snapshot = state.snapshot();
    snapshot.version = 2;
    snapshot.polygons.clear();

    assert!(matches!(
        state.load_snapshot(&snapshot),
        Err(SnapshotError::UnsupportedVersion { version: 2, .. })
    ));
    assert_eq!(state.canvas.polygons().len(), 2);
}

#[test]
fn test_loading_discards_drafts_and_unknown_active_layer() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    click(&mut state, 0.0, 0.0);

    let json = r#"{
        "version": 1,
        "activeLayerId": "gone",
        "layers": [
            {"id": "r", "name": "Main road", "kind": "road", "roadWidthMeters": 6},
            {"id": "t", "kind": "terrain"}
        ]
    }"#;
    let snapshot = PlanningSnapshot::from_json(json).unwrap();
    state.load_snapshot(&snapshot).unwrap();

    assert!(!state.has_draft());
    assert_eq!(state.canvas.active_layer_id(), "r");
    assert_eq!(state.mode(), DrawingMode::Select);
    assert_eq!(state.canvas.layer("r").unwrap().road_width(), Some(6.0));
    assert!(!state.is_modified);
}

#[test]
fn test_polyline_points_without_ids_get_stable_ids() {
    let json = r#"{
        "version": 1,
        "activeLayerId": "r",
        "layers": [{"id": "r", "kind": "road"}],
        "polylines": [
            {"id": "a", "layerId": "r", "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}]},
            {"id": "b", "layerId": "r", "points": [{"x": 0, "y": 0}, {"id": "v1", "x": 0, "y": 10}]}
        ]
    }"#;
    let input = PlanningSnapshot::from_json(json).unwrap();
    let (canvas, report) = input.to_canvas().unwrap();
    assert_eq!(report.features, 2);

    let encoded = PlanningSnapshot::from_canvas(&canvas);
    assert_ne!(encoded.polylines, input.polylines);
    let ids: Vec<&str> = encoded
        .polylines
        .iter()
        .flat_map(|line| line.points.iter())
        .map(|point| point.id.as_deref().unwrap())
        .collect();
    assert_eq!(ids.len(), 4);
    // Equal coordinates without ids stay separate vertices.
    assert_ne!(ids[0], ids[2]);
    assert_eq!(ids[3], "v1");
    for (decoded, original) in encoded.polylines.iter().zip(&input.polylines) {
        let coords = |line: &siteplan_designer::serialization::PolylineRecord| {
            line.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()
        };
        assert_eq!(coords(decoded), coords(original));
    }

    let (again, _) = encoded.to_canvas().unwrap();
    assert_eq!(PlanningSnapshot::from_canvas(&again).polylines, encoded.polylines);
}

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");

    let mut state = populated_state();
    state.save_to_file(&path).unwrap();
    assert!(!state.is_modified);

    let mut loaded = DesignerState::new();
    let report = loaded.load_from_file(&path).unwrap();
    assert_eq!(report.features, 4);
    assert_eq!(loaded.snapshot(), state.snapshot());

    assert!(loaded.load_from_file(dir.path().join("missing.json")).is_err());
}
