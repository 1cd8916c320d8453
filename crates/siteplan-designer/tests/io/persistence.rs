use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{DrawingMode, FeatureRef, PlanStore, Point, PointerInput, StoredPlan};
use tempfile::TempDir;

fn drag_rectangle(state: &mut DesignerState, a: (f64, f64), b: (f64, f64)) {
    let view = state.canvas.viewport();
    let start = view.world_to_screen(Point::new(a.0, a.1));
    let end = view.world_to_screen(Point::new(b.0, b.1));
    state.set_mode(DrawingMode::Rectangle).unwrap();
    state.on_pointer_down(PointerInput::primary(1, start.x, start.y));
    state.on_pointer_up(PointerInput::primary(1, end.x, end.y));
}

#[test]
fn test_never_saved_leaves_model() {
    let dir = TempDir::new().unwrap();
    let store = PlanStore::new(dir.path().join("plan.json"));

    let mut state = DesignerState::new();
    drag_rectangle(&mut state, (0.0, 0.0), (10.0, 10.0));
    assert_eq!(state.load_from_store(&store).unwrap(), StoredPlan::NeverSaved);
    assert_eq!(state.canvas.polygons().len(), 1);
}

#[test]
fn test_saved_plan_is_restored() {
    let dir = TempDir::new().unwrap();
    let store = PlanStore::new(dir.path().join("nested").join("plan.json"));

    let mut state = DesignerState::new();
    drag_rectangle(&mut state, (0.0, 0.0), (10.0, 10.0));
    assert!(state.is_modified);
    let stored = state.save_to_store(&store).unwrap();
    assert!(matches!(stored, StoredPlan::Saved { .. }));
    assert!(!state.is_modified);

    let mut fresh = DesignerState::new();
    let loaded = fresh.load_from_store(&store).unwrap();
    assert_eq!(loaded.snapshot(), stored.snapshot());
    assert_eq!(fresh.canvas.polygons(), state.canvas.polygons());
}

#[test]
fn test_empty_plan_writes_cleared_marker() {
    let dir = TempDir::new().unwrap();
    let store = PlanStore::new(dir.path().join("plan.json"));

    let mut state = DesignerState::new();
    drag_rectangle(&mut state, (0.0, 0.0), (10.0, 10.0));
    state.save_to_store(&store).unwrap();

    let id = state.canvas.polygons()[0].id.clone();
    state.select(FeatureRef::Polygon(id));
    state.delete_selected().unwrap();
    let stored = state.save_to_store(&store).unwrap();
    assert!(matches!(stored, StoredPlan::Cleared { .. }));

    // A cleared store empties a model that still holds features.
    let mut other = DesignerState::new();
    drag_rectangle(&mut other, (20.0, 20.0), (40.0, 40.0));
    let loaded = other.load_from_store(&store).unwrap();
    assert!(matches!(loaded, StoredPlan::Cleared { .. }));
    assert!(other.canvas.is_empty());
    assert!(!other.is_modified);
}

#[test]
fn test_corrupted_store_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut state = DesignerState::new();
    drag_rectangle(&mut state, (0.0, 0.0), (10.0, 10.0));
    assert!(state.load_from_store(&PlanStore::new(&path)).is_err());
    assert_eq!(state.canvas.polygons().len(), 1);
}
