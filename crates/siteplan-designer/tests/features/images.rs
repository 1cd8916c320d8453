use siteplan_designer::designer_state::DesignerState;
use siteplan_designer::{
    DragSession, DrawingMode, FeatureRef, LayerKind, PlanningImage, Point, PointerInput,
};

fn input(state: &DesignerState, x: f64, y: f64) -> PointerInput {
    let screen = state.canvas.viewport().world_to_screen(Point::new(x, y));
    PointerInput::primary(1, screen.x, screen.y)
}

fn drag(state: &mut DesignerState, from: (f64, f64), to: (f64, f64)) -> bool {
    let start = input(state, from.0, from.1);
    let end = input(state, to.0, to.1);
    let started = state.on_pointer_down(start);
    state.on_pointer_move(end);
    state.flush_frame();
    state.on_pointer_up(end);
    started
}

fn image_at(state: &mut DesignerState, x: f64, y: f64, w: f64, h: f64) -> String {
    let mut image = PlanningImage::new("survey.png", w, h);
    image.position = Point::new(x, y);
    state.add_image(image)
}

#[test]
fn test_image_move() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 50.0);
    assert!(drag(&mut state, (50.0, 25.0), (60.0, 30.0)));
    let image = state.canvas.image(&id).unwrap();
    assert_eq!(image.position, Point::new(10.0, 5.0));
    assert_eq!(state.canvas.selected(), Some(&FeatureRef::Image(id)));
}

#[test]
fn test_corner_resize_keeps_aspect_ratio() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 50.0);
    state.select(FeatureRef::Image(id.clone()));

    let press = input(&state, 100.0, 50.0);
    assert!(state.on_pointer_down(press));
    assert!(matches!(state.session(), DragSession::ResizeImage { .. }));
    let release = input(&state, 120.0, 50.0);
    state.on_pointer_move(release);
    state.on_pointer_up(release);

    let image = state.canvas.image(&id).unwrap();
    assert!((image.scale - 1.2).abs() < 1e-9);
    assert_eq!(image.position, Point::new(0.0, 0.0));
    let frame = image.frame();
    assert!((frame.w - 120.0).abs() < 1e-9);
    assert!((frame.h - 60.0).abs() < 1e-9);
}

#[test]
fn test_top_left_resize_anchors_opposite_corner() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 50.0);
    state.select(FeatureRef::Image(id.clone()));
    drag(&mut state, (0.0, 0.0), (-20.0, 0.0));

    let frame = state.canvas.image(&id).unwrap().frame();
    assert!((frame.right() - 100.0).abs() < 1e-9);
    assert!((frame.bottom() - 50.0).abs() < 1e-9);
    assert!((frame.x + 20.0).abs() < 1e-9);
    assert!((frame.y + 10.0).abs() < 1e-9);
}

#[test]
fn test_images_are_hit_on_linear_layers() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 50.0);
    let road = state.add_layer(LayerKind::Road);
    state.set_active_layer(&road).unwrap();
    assert!(drag(&mut state, (50.0, 25.0), (55.0, 25.0)));
    assert_eq!(
        state.canvas.image(&id).unwrap().position,
        Point::new(5.0, 0.0)
    );
}

#[test]
fn test_locked_image_selects_only() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 50.0);
    state.canvas.image_mut(&id).unwrap().locked = true;
    assert!(!drag(&mut state, (50.0, 25.0), (70.0, 25.0)));
    assert_eq!(
        state.canvas.image(&id).unwrap().position,
        Point::new(0.0, 0.0)
    );
    assert_eq!(state.canvas.selected(), Some(&FeatureRef::Image(id)));
}

#[test]
fn test_align_marker_placement_and_drag() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 100.0);
    state.set_mode(DrawingMode::AlignMarker).unwrap();

    assert!(drag(&mut state, (10.0, 10.0), (12.0, 14.0)));
    let image = state.canvas.image(&id).unwrap();
    assert_eq!(image.align_marker, Some(Point::new(12.0, 14.0)));
    assert_eq!(state.canvas.selected(), Some(&FeatureRef::Image(id)));
    assert!(state.is_modified);
}

#[test]
fn test_align_images_to_reference() {
    let mut state = DesignerState::new();
    let reference = image_at(&mut state, 0.0, 0.0, 100.0, 100.0);
    let other = image_at(&mut state, 200.0, 0.0, 100.0, 100.0);
    state.canvas.image_mut(&other).unwrap().scale = 2.0;
    state.set_mode(DrawingMode::AlignMarker).unwrap();

    drag(&mut state, (50.0, 50.0), (50.0, 50.0));
    drag(&mut state, (260.0, 40.0), (260.0, 40.0));
    assert_eq!(
        state.canvas.image(&other).unwrap().align_marker,
        Some(Point::new(30.0, 20.0))
    );

    assert_eq!(state.align_images_to(&reference), Ok(1));
    let moved = state.canvas.image(&other).unwrap();
    assert_eq!(moved.position, Point::new(-10.0, 10.0));
    assert_eq!(moved.marker_world(), Some(Point::new(50.0, 50.0)));
}

#[test]
fn test_align_requires_reference_marker() {
    let mut state = DesignerState::new();
    let reference = image_at(&mut state, 0.0, 0.0, 100.0, 100.0);
    assert!(state.align_images_to(&reference).is_err());
    assert!(state.align_images_to("img-missing").is_err());
}

#[test]
fn test_marker_tool_skips_locked_images() {
    let mut state = DesignerState::new();
    let id = image_at(&mut state, 0.0, 0.0, 100.0, 100.0);
    state.canvas.image_mut(&id).unwrap().locked = true;
    state.set_mode(DrawingMode::AlignMarker).unwrap();

    let press = input(&state, 10.0, 10.0);
    assert!(!state.on_pointer_down(press));
    assert_eq!(state.canvas.image(&id).unwrap().align_marker, None);
}
