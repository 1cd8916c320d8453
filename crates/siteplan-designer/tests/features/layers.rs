use siteplan_core::event_bus::{
    EventBus, EventBusConfig, ModelEvent, PlanEvent, SelectionEvent,
};
use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{
    DrawingMode, FeatureRef, HitTarget, LayerKind, PlanPolygon, Point,
};

fn recording_state() -> DesignerState {
    DesignerState::new().with_event_bus(EventBus::with_config(EventBusConfig {
        enable_history: true,
        max_history_size: 256,
    }))
}

fn square_on(state: &mut DesignerState, layer: &str) -> String {
    state
        .canvas
        .add_polygon(PlanPolygon::rectangle(
            layer.to_string(),
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        ))
        .unwrap()
}

#[test]
fn test_layer_lifecycle_events() {
    let mut state = recording_state();
    let green = state.add_layer(LayerKind::Green);
    state.set_active_layer(&green).unwrap();
    state.remove_layer(&green).unwrap();

    let history = state.events().history();
    let model: Vec<&ModelEvent> = history
        .iter()
        .filter_map(|event| match event {
            PlanEvent::Model(model) => Some(model),
            _ => None,
        })
        .collect();
    assert_eq!(model[0], &ModelEvent::LayerAdded { id: green.clone() });
    assert_eq!(
        model[1],
        &ModelEvent::ActiveLayerChanged { id: green.clone() }
    );
    assert_eq!(model[2], &ModelEvent::LayerRemoved { id: green });
    assert!(matches!(model[3], ModelEvent::ActiveLayerChanged { .. }));
}

#[test]
fn test_removing_layer_clears_its_selection() {
    let mut state = recording_state();
    let terrain = state.canvas.active_layer_id().to_string();
    let water = state.add_layer(LayerKind::Water);
    state.set_active_layer(&water).unwrap();
    let pond = square_on(&mut state, &water);
    state.select(FeatureRef::Polygon(pond));

    state.remove_layer(&water).unwrap();
    assert_eq!(state.canvas.active_layer_id(), terrain);
    assert!(state.canvas.polygons().is_empty());
    assert!(state
        .events()
        .history()
        .contains(&PlanEvent::Selection(SelectionEvent::Changed { id: None })));
}

#[test]
fn test_hidden_layer_is_not_hit() {
    let mut state = DesignerState::new();
    let terrain = state.canvas.active_layer_id().to_string();
    square_on(&mut state, &terrain);
    let settings = *state.interaction();
    assert!(matches!(
        state.canvas.hit_test(Point::new(5.0, 5.0), &settings),
        Some(HitTarget::Polygon(_))
    ));

    state.set_layer_visible(&terrain, false).unwrap();
    assert_eq!(state.canvas.hit_test(Point::new(5.0, 5.0), &settings), None);
}

#[test]
fn test_kind_change_drops_forbidden_tool() {
    let mut state = DesignerState::new();
    let terrain = state.canvas.active_layer_id().to_string();
    state.set_mode(DrawingMode::Rectangle).unwrap();

    state
        .update_layer(&terrain, |layer| layer.kind = LayerKind::Road)
        .unwrap();
    assert_eq!(state.mode(), DrawingMode::Select);
    assert!(state.canvas.layer(&terrain).unwrap().road_width().is_some());
    assert!(state.set_mode(DrawingMode::Line).is_ok());
}

#[test]
fn test_unknown_layer_is_refused() {
    let mut state = DesignerState::new();
    assert!(state.set_active_layer("layer-missing").is_err());
    assert!(state.remove_layer("layer-missing").is_err());
    assert!(state.set_layer_locked("layer-missing", true).is_err());
}

#[test]
fn test_layer_switch_keeps_features_on_their_layer() {
    let mut state = DesignerState::new();
    let terrain = state.canvas.active_layer_id().to_string();
    let building = state.add_layer(LayerKind::Building);
    state.set_active_layer(&building).unwrap();
    let house = square_on(&mut state, &building);
    state.set_active_layer(&terrain).unwrap();

    assert_eq!(
        state.canvas.feature_layer(&FeatureRef::Polygon(house)).map(|l| l.id.clone()),
        Some(building)
    );
    assert_eq!(state.canvas.hit_test(Point::new(5.0, 5.0), state.interaction()), None);
}
