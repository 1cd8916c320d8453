use std::sync::{Arc, Mutex};

use siteplan_core::error::ModelError;
use siteplan_core::event_bus::{
    EventBus, EventBusConfig, EventCategory, EventFilter, FeatureKind, ModelEvent, PlanEvent,
    SelectionEvent,
};
use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{
    DrawingMode, FeatureRef, Key, LayerKind, PlanPolygon, Point, PointerInput,
};

fn recording_state() -> DesignerState {
    DesignerState::new().with_event_bus(EventBus::with_config(EventBusConfig {
        enable_history: true,
        max_history_size: 256,
    }))
}

fn input(state: &DesignerState, pointer_id: u64, x: f64, y: f64) -> PointerInput {
    let screen = state.canvas.viewport().world_to_screen(Point::new(x, y));
    PointerInput::primary(pointer_id, screen.x, screen.y)
}

fn click(state: &mut DesignerState, x: f64, y: f64) {
    let p = input(state, 1, x, y);
    state.on_pointer_down(p);
    state.on_pointer_up(p);
}

#[test]
fn test_designer_state_new() {
    let state = DesignerState::new();
    assert_eq!(state.mode(), DrawingMode::Select);
    assert!(state.session().is_idle());
    assert!(state.canvas.is_empty());
    assert!(!state.is_modified);
    assert_eq!(state.canvas.layers().len(), 1);
}

#[test]
fn test_mode_gating() {
    let mut state = DesignerState::new();
    assert!(state.set_mode(DrawingMode::Rectangle).is_ok());
    assert!(matches!(
        state.set_mode(DrawingMode::Line),
        Err(ModelError::ToolNotAllowed { .. })
    ));
    assert_eq!(state.mode(), DrawingMode::Rectangle);

    let road = state.add_layer(LayerKind::Road);
    state.set_active_layer(&road).unwrap();
    // Rectangle is forbidden on roads, so the tool falls back to select.
    assert_eq!(state.mode(), DrawingMode::Select);
    assert!(state.set_mode(DrawingMode::FreehandPolygon).is_err());
    assert!(state.set_mode(DrawingMode::Line).is_ok());
    assert!(state.set_mode(DrawingMode::AlignMarker).is_ok());
}

#[test]
fn test_layer_switch_commits_draft_to_previous_layer() {
    let mut state = DesignerState::new();
    let terrain = state.canvas.active_layer_id().to_string();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    click(&mut state, 0.0, 0.0);
    click(&mut state, 10.0, 0.0);
    click(&mut state, 10.0, 10.0);

    let water = state.add_layer(LayerKind::Water);
    state.set_active_layer(&water).unwrap();

    assert_eq!(state.canvas.polygons().len(), 1);
    assert_eq!(state.canvas.polygons()[0].layer_id, terrain);
    assert!(state.freehand_draft().is_empty());
    assert_eq!(state.mode(), DrawingMode::FreehandPolygon);
}

#[test]
fn test_delete_key_removes_selection() {
    let mut state = recording_state();
    let layer = state.canvas.active_layer_id().to_string();
    let id = state
        .canvas
        .add_polygon(PlanPolygon::rectangle(layer, Point::new(0.0, 0.0), Point::new(10.0, 10.0)))
        .unwrap();
    state.select(FeatureRef::Polygon(id.clone()));

    assert!(state.on_key(Key::Delete));
    assert!(state.canvas.polygons().is_empty());
    assert!(state.canvas.selected().is_none());

    let history = state.events().history();
    assert!(history.contains(&PlanEvent::Model(ModelEvent::FeatureDeleted {
        kind: FeatureKind::Polygon,
        id,
    })));
    assert_eq!(
        history.last(),
        Some(&PlanEvent::Selection(SelectionEvent::Changed { id: None }))
    );
    assert!(!state.on_key(Key::Backspace));
}

#[test]
fn test_delete_key_respects_locked_layer() {
    let mut state = DesignerState::new();
    let layer = state.canvas.active_layer_id().to_string();
    let id = state
        .canvas
        .add_polygon(PlanPolygon::rectangle(
            layer.clone(),
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        ))
        .unwrap();
    state.select(FeatureRef::Polygon(id));
    state.set_layer_locked(&layer, true).unwrap();

    assert!(!state.on_key(Key::Delete));
    assert_eq!(state.canvas.polygons().len(), 1);
}

#[test]
fn test_last_layer_is_kept() {
    let mut state = DesignerState::new();
    let only = state.canvas.active_layer_id().to_string();
    assert_eq!(state.remove_layer(&only), Err(ModelError::LastLayer));
}

#[test]
fn test_update_layer_keeps_params_matching_kind() {
    let mut state = DesignerState::new();
    let road = state.add_layer(LayerKind::Road);
    state
        .update_layer(&road, |layer| layer.set_road_width(42.0))
        .unwrap();
    assert_eq!(state.canvas.layer(&road).unwrap().road_width(), Some(10.0));

    state
        .update_layer(&road, |layer| layer.kind = LayerKind::Wall)
        .unwrap();
    let layer = state.canvas.layer(&road).unwrap();
    assert_eq!(layer.road_width(), None);
    assert_eq!(
        layer.params(),
        siteplan_designer::LayerParams::defaults_for(LayerKind::Wall)
    );
}

#[test]
fn test_subscribers_receive_filtered_events() {
    let mut state = DesignerState::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = state.events().subscribe(
        EventFilter::Categories(vec![EventCategory::View]),
        move |event| sink.lock().unwrap().push(event.clone()),
    );

    state.set_viewport_size(800.0, 600.0);
    state.fit_to_view();
    state.add_layer(LayerKind::Green);
    assert_eq!(seen.lock().unwrap().len(), 2);

    assert!(state.events().unsubscribe(subscription));
    state.zoom_in_at(Point::new(400.0, 300.0));
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_zoom_keeps_anchor_through_state() {
    let mut state = DesignerState::new();
    state.set_viewport_size(1024.0, 768.0);
    state.fit_to_view();
    let anchor = Point::new(300.0, 500.0);
    let before = state.canvas.viewport().screen_to_world(anchor);
    state.zoom_in_at(anchor);
    state.zoom_out_at(anchor);
    state.zoom_at(state.canvas.viewport().fit_scale() * 2.5, anchor);
    let after = state.canvas.viewport().screen_to_world(anchor);
    assert!((before.x - after.x).abs() < 1e-6);
    assert!((before.y - after.y).abs() < 1e-6);
}

#[test]
fn test_escape_discards_drafts() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    click(&mut state, 0.0, 0.0);
    click(&mut state, 10.0, 0.0);
    assert!(state.has_draft());
    assert!(state.on_key(Key::Escape));
    assert!(!state.has_draft());
    assert!(!state.on_key(Key::Escape));
    assert!(state.canvas.polygons().is_empty());
}
