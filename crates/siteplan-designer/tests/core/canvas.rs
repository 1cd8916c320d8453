use siteplan_core::error::ModelError;
use siteplan_core::tuning::InteractionSettings;
use siteplan_designer::{
    Canvas, FeatureRef, HitTarget, LayerKind, PlanPolygon, PlanPolyline, PlanningImage, Point,
};

fn rect(layer: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> PlanPolygon {
    PlanPolygon::rectangle(layer.to_string(), Point::new(x0, y0), Point::new(x1, y1))
}

fn add_line(canvas: &mut Canvas, layer: &str, points: &[Point]) -> String {
    let ids = points
        .iter()
        .map(|p| canvas.vertices_mut().insert(*p))
        .collect();
    canvas
        .add_polyline(PlanPolyline::new(layer.to_string(), ids))
        .unwrap()
}

#[test]
fn test_last_layer_cannot_be_removed() {
    let mut canvas = Canvas::new();
    let only = canvas.active_layer_id().to_string();
    assert_eq!(canvas.remove_layer(&only), Err(ModelError::LastLayer));
    assert_eq!(canvas.layers().len(), 1);
}

#[test]
fn test_remove_layer_drops_features_and_orphans() {
    let mut canvas = Canvas::new();
    let terrain = canvas.active_layer_id().to_string();
    let road = canvas.add_layer(LayerKind::Road);
    canvas.add_polygon(rect(&terrain, 0.0, 0.0, 10.0, 10.0)).unwrap();
    add_line(&mut canvas, &road, &[Point::new(0.0, 0.0), Point::new(30.0, 0.0)]);
    assert_eq!(canvas.vertices().len(), 2);

    canvas.remove_layer(&road).unwrap();
    assert!(canvas.polylines().is_empty());
    assert!(canvas.vertices().is_empty());
    assert_eq!(canvas.polygons().len(), 1);
}

#[test]
fn test_removing_active_layer_activates_first() {
    let mut canvas = Canvas::new();
    let terrain = canvas.active_layer_id().to_string();
    let water = canvas.add_layer(LayerKind::Water);
    canvas.set_active_layer(&water).unwrap();
    canvas.remove_layer(&water).unwrap();
    assert_eq!(canvas.active_layer_id(), terrain);
}

#[test]
fn test_degenerate_features_are_refused() {
    let mut canvas = Canvas::new();
    let layer = canvas.active_layer_id().to_string();
    let two_points = PlanPolygon::new(layer.clone(), vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    assert!(matches!(
        canvas.add_polygon(two_points),
        Err(ModelError::Degenerate { .. })
    ));
    let stray = PlanPolygon::new("layer-missing", vec![Point::default(); 3]);
    assert!(matches!(
        canvas.add_polygon(stray),
        Err(ModelError::LayerNotFound { .. })
    ));
}

#[test]
fn test_hit_priority_polyline_over_polygon() {
    let mut canvas = Canvas::new();
    let layer = canvas.active_layer_id().to_string();
    let polygon = canvas.add_polygon(rect(&layer, 0.0, 0.0, 20.0, 20.0)).unwrap();
    let line = add_line(&mut canvas, &layer, &[Point::new(0.0, 10.0), Point::new(20.0, 10.0)]);
    let settings = InteractionSettings::default();

    assert_eq!(
        canvas.hit_test(Point::new(10.0, 10.2), &settings),
        Some(HitTarget::Polyline(line))
    );
    assert_eq!(
        canvas.hit_test(Point::new(5.0, 5.0), &settings),
        Some(HitTarget::Polygon(polygon))
    );
    assert_eq!(canvas.hit_test(Point::new(50.0, 50.0), &settings), None);
}

#[test]
fn test_hit_ignores_other_layers() {
    let mut canvas = Canvas::new();
    let terrain = canvas.active_layer_id().to_string();
    canvas.add_polygon(rect(&terrain, 0.0, 0.0, 20.0, 20.0)).unwrap();
    let building = canvas.add_layer(LayerKind::Building);
    canvas.set_active_layer(&building).unwrap();
    let settings = InteractionSettings::default();
    assert_eq!(canvas.hit_test(Point::new(5.0, 5.0), &settings), None);
}

#[test]
fn test_topmost_polygon_wins() {
    let mut canvas = Canvas::new();
    let layer = canvas.active_layer_id().to_string();
    canvas.add_polygon(rect(&layer, 0.0, 0.0, 20.0, 20.0)).unwrap();
    let top = canvas.add_polygon(rect(&layer, 5.0, 5.0, 15.0, 15.0)).unwrap();
    assert_eq!(canvas.polygon_at(Point::new(10.0, 10.0)), Some(top));
}

#[test]
fn test_selected_polygon_vertex_handle_first() {
    let mut canvas = Canvas::new();
    let layer = canvas.active_layer_id().to_string();
    let id = canvas.add_polygon(rect(&layer, 0.0, 0.0, 20.0, 20.0)).unwrap();
    canvas.select(FeatureRef::Polygon(id.clone()));
    let settings = InteractionSettings::default();
    assert_eq!(
        canvas.hit_test(Point::new(20.5, 0.5), &settings),
        Some(HitTarget::PolygonVertex {
            polygon_id: id,
            index: 1
        })
    );
}

#[test]
fn test_shared_vertex_moves_both_polylines() {
    let mut canvas = Canvas::new();
    let road = canvas.add_layer(LayerKind::Road);
    let shared = canvas.vertices_mut().insert(Point::new(10.0, 0.0));
    let a = canvas.vertices_mut().insert(Point::new(0.0, 0.0));
    let b = canvas.vertices_mut().insert(Point::new(10.0, 10.0));
    let first = canvas
        .add_polyline(PlanPolyline::new(road.clone(), vec![a, shared.clone()]))
        .unwrap();
    let second = canvas
        .add_polyline(PlanPolyline::new(road, vec![shared.clone(), b]))
        .unwrap();

    canvas.move_vertex(&shared, Point::new(12.0, 1.0));
    let first_points = canvas.polyline_points(canvas.polyline(&first).unwrap());
    let second_points = canvas.polyline_points(canvas.polyline(&second).unwrap());
    assert_eq!(first_points[1], Point::new(12.0, 1.0));
    assert_eq!(second_points[0], Point::new(12.0, 1.0));

    canvas.remove_polyline(&first).unwrap();
    assert!(canvas.vertices().contains(&shared));
    assert_eq!(canvas.vertices().len(), 2);
}

#[test]
fn test_selection_scoped_to_active_layer() {
    let mut canvas = Canvas::new();
    let terrain = canvas.active_layer_id().to_string();
    let id = canvas.add_polygon(rect(&terrain, 0.0, 0.0, 5.0, 5.0)).unwrap();
    assert!(canvas.select(FeatureRef::Polygon(id.clone())));

    let green = canvas.add_layer(LayerKind::Green);
    canvas.set_active_layer(&green).unwrap();
    assert_eq!(canvas.selected(), None);
    assert!(!canvas.select(FeatureRef::Polygon(id)));
}

#[test]
fn test_images_selectable_on_any_layer() {
    let mut canvas = Canvas::new();
    let image = canvas.add_image(PlanningImage::new("plan.png", 100.0, 50.0));
    let road = canvas.add_layer(LayerKind::Road);
    canvas.set_active_layer(&road).unwrap();
    assert!(canvas.select(FeatureRef::Image(image.clone())));
    assert_eq!(canvas.image_at(Point::new(50.0, 25.0)), Some(image));
}

#[test]
fn test_locked_layer_blocks_delete() {
    let mut canvas = Canvas::new();
    let layer = canvas.active_layer_id().to_string();
    let id = canvas.add_polygon(rect(&layer, 0.0, 0.0, 5.0, 5.0)).unwrap();
    canvas.layer_mut(&layer).unwrap().locked = true;
    let feature = FeatureRef::Polygon(id);
    assert!(matches!(
        canvas.delete_feature(&feature),
        Err(ModelError::Locked { .. })
    ));
    assert!(canvas.feature_exists(&feature));
}
