use siteplan_core::event_bus::{EventBus, EventBusConfig, FeatureKind, ModelEvent, PlanEvent};
use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{
    DragSession, DrawingMode, FeatureRef, Key, PlanPolygon, Point, PointerInput,
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

fn add_square(state: &mut DesignerState, x: f64, y: f64, size: f64) -> String {
    let layer = state.canvas.active_layer_id().to_string();
    state
        .canvas
        .add_polygon(PlanPolygon::rectangle(
            layer,
            Point::new(x, y),
            Point::new(x + size, y + size),
        ))
        .unwrap()
}

#[test]
fn test_moves_coalesce_until_flush() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::Rectangle).unwrap();
    let start = input(&state, 1, 0.0, 0.0);
    state.on_pointer_down(start);

    let first = input(&state, 1, 5.0, 5.0);
    let last = input(&state, 1, 8.0, 6.0);
    state.on_pointer_move(first);
    state.on_pointer_move(last);

    assert_eq!(
        state.rectangle_draft(),
        Some((Point::new(0.0, 0.0), Point::new(0.0, 0.0)))
    );
    assert_eq!(state.pending_frame().session_pointer, Some(last.position));

    assert!(state.flush_frame());
    assert_eq!(
        state.rectangle_draft(),
        Some((Point::new(0.0, 0.0), Point::new(8.0, 6.0)))
    );
    assert!(state.pending_frame().is_empty());
    assert!(!state.flush_frame());
}

#[test]
fn test_hover_recorded_only_when_idle() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    let hover = input(&state, 1, 3.0, 4.0);
    state.on_pointer_move(hover);
    assert_eq!(state.hover_point(), None);
    state.flush_frame();
    assert_eq!(state.hover_point(), Some(Point::new(3.0, 4.0)));
}

#[test]
fn test_second_pointer_is_ignored() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::Rectangle).unwrap();
    let first = input(&state, 1, 0.0, 0.0);
    assert!(state.on_pointer_down(first));

    let intruder = input(&state, 2, 50.0, 50.0);
    assert!(!state.on_pointer_down(intruder));
    state.on_pointer_move(intruder);
    state.on_pointer_up(intruder);
    assert!(state.pending_frame().is_empty());
    assert_eq!(state.session().pointer_id(), Some(1));

    let release = input(&state, 1, 10.0, 10.0);
    state.on_pointer_up(release);
    assert_eq!(state.canvas.polygons().len(), 1);
    assert_eq!(state.canvas.polygons()[0].points[2], Point::new(10.0, 10.0));
}

#[test]
fn test_secondary_click_cancels_drafts() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    for (x, y) in [(0.0, 0.0), (10.0, 0.0)] {
        let p = input(&state, 1, x, y);
        state.on_pointer_down(p);
        state.on_pointer_up(p);
    }
    assert!(state.has_draft());
    let offset = state.canvas.viewport().offset();

    let right = PointerInput::secondary(1, 100.0, 100.0);
    assert!(state.on_pointer_down(right));
    state.on_pointer_up(right);

    assert!(!state.has_draft());
    assert_eq!(state.canvas.viewport().offset(), offset);
    assert!(state.session().is_idle());
}

#[test]
fn test_secondary_drag_pans_and_keeps_drafts() {
    let mut state = DesignerState::new();
    state.set_mode(DrawingMode::FreehandPolygon).unwrap();
    let p = input(&state, 1, 0.0, 0.0);
    state.on_pointer_down(p);
    state.on_pointer_up(p);

    let scale = state.canvas.viewport().render_scale();
    state.on_pointer_down(PointerInput::secondary(1, 100.0, 100.0));
    state.on_pointer_move(PointerInput::secondary(1, 140.0, 100.0));
    state.flush_frame();
    state.on_pointer_up(PointerInput::secondary(1, 140.0, 100.0));

    let offset = state.canvas.viewport().offset();
    assert!((offset.x - 40.0 / scale).abs() < 1e-9);
    assert!(offset.y.abs() < 1e-9);
    assert_eq!(state.freehand_draft().len(), 1);
}

#[test]
fn test_select_on_empty_space_pans() {
    let mut state = DesignerState::new();
    let press = input(&state, 1, 200.0, 200.0);
    assert!(state.on_pointer_down(press));
    assert!(matches!(state.session(), DragSession::Pan { .. }));
    state.on_pointer_move(PointerInput::primary(1, press.position.x + 20.0, press.position.y));
    state.flush_frame();
    assert!(state.canvas.viewport().offset().x > 0.0);
}

#[test]
fn test_polygon_move_uses_start_geometry() {
    let mut state = recording_state();
    let id = add_square(&mut state, 0.0, 0.0, 10.0);

    let press = input(&state, 1, 5.0, 5.0);
    assert!(state.on_pointer_down(press));
    assert_eq!(state.canvas.selected(), Some(&FeatureRef::Polygon(id.clone())));

    for (x, y) in [(5.5, 5.0), (6.0, 7.0), (7.0, 8.0)] {
        let p = input(&state, 1, x, y);
        state.on_pointer_move(p);
        state.flush_frame();
    }
    let release = input(&state, 1, 7.0, 8.0);
    state.on_pointer_up(release);

    let polygon = state.canvas.polygon(&id).unwrap();
    assert_eq!(polygon.points[0], Point::new(2.0, 3.0));
    assert_eq!(polygon.points[2], Point::new(12.0, 13.0));
    assert!(state.is_modified);
    assert!(state
        .events()
        .history()
        .contains(&PlanEvent::Model(ModelEvent::FeatureUpdated {
            kind: FeatureKind::Polygon,
            id,
        })));
}

#[test]
fn test_escape_restores_dragged_polygon() {
    let mut state = DesignerState::new();
    let id = add_square(&mut state, 0.0, 0.0, 10.0);
    let press = input(&state, 1, 5.0, 5.0);
    state.on_pointer_down(press);
    let moved = input(&state, 1, 25.0, 5.0);
    state.on_pointer_move(moved);
    state.flush_frame();
    assert_eq!(state.canvas.polygon(&id).unwrap().points[0], Point::new(20.0, 0.0));

    assert!(state.on_key(Key::Escape));
    assert_eq!(state.canvas.polygon(&id).unwrap().points[0], Point::new(0.0, 0.0));
    assert!(state.session().is_idle());

    // The release of the cancelled pointer is ignored.
    state.on_pointer_up(moved);
    assert_eq!(state.canvas.polygon(&id).unwrap().points[0], Point::new(0.0, 0.0));
    assert!(!state.is_modified);
}

#[test]
fn test_polygon_vertex_drag() {
    let mut state = DesignerState::new();
    let id = add_square(&mut state, 0.0, 0.0, 20.0);
    state.select(FeatureRef::Polygon(id.clone()));

    let press = input(&state, 1, 20.0, 20.0);
    assert!(state.on_pointer_down(press));
    assert!(matches!(state.session(), DragSession::DragVertex { .. }));
    let release = input(&state, 1, 24.0, 26.0);
    state.on_pointer_move(release);
    state.on_pointer_up(release);

    assert_eq!(state.canvas.polygon(&id).unwrap().points[2], Point::new(24.0, 26.0));
}

#[test]
fn test_locked_layer_selects_without_session() {
    let mut state = DesignerState::new();
    let id = add_square(&mut state, 0.0, 0.0, 10.0);
    let layer = state.canvas.active_layer_id().to_string();
    state.set_layer_locked(&layer, true).unwrap();

    let press = input(&state, 1, 5.0, 5.0);
    assert!(!state.on_pointer_down(press));
    assert_eq!(state.canvas.selected(), Some(&FeatureRef::Polygon(id.clone())));
    assert!(state.session().is_idle());

    let moved = input(&state, 1, 9.0, 9.0);
    state.on_pointer_move(moved);
    state.flush_frame();
    state.on_pointer_up(moved);
    assert_eq!(state.canvas.polygon(&id).unwrap().points[0], Point::new(0.0, 0.0));
}
