use proptest::prelude::*;
use siteplan_core::tuning::ViewSettings;
use siteplan_designer::{FixedGround, Point, ViewTransform};

fn fitted_view(width: f64, height: f64) -> ViewTransform {
    let mut view = ViewTransform::new(&ViewSettings::default());
    view.set_viewport_size(width, height);
    view.fit_to_content(24.0);
    view
}

#[test]
fn test_ground_provider_changes_fit() {
    let mut view = ViewTransform::default();
    view.set_viewport_size(800.0, 800.0);
    let default_fit = view.fit_to_content(0.0);

    view.apply_ground(&FixedGround {
        width_m: 100.0,
        depth_m: 100.0,
    });
    let small_fit = view.fit_to_content(0.0);
    assert!((small_fit - default_fit * 4.0).abs() < 1e-12);
    assert_eq!(view.content_size(), (100.0, 100.0));
}

#[test]
fn test_zoom_limits_follow_fit() {
    let view = fitted_view(1000.0, 700.0);
    let (min, max) = view.zoom_limits();
    assert!((min - view.fit_scale() * 0.1).abs() < 1e-12);
    assert!((max - view.fit_scale() * 4.0).abs() < 1e-12);
}

#[test]
fn test_zoom_limits_track_viewport_resize() {
    let mut view = fitted_view(800.0, 600.0);
    view.set_viewport_size(3200.0, 2400.0);
    // min((3200-48)/1600, (2400-48)/1600)
    let fit = 2352.0 / 1600.0;
    assert!((view.fit_scale() - fit).abs() < 1e-12);

    let applied = view.zoom_at_anchor(100.0, Point::new(1600.0, 1200.0));
    assert!((applied - fit * 4.0).abs() < 1e-12);

    view.set_content_size(100.0, 100.0);
    let (_, max) = view.zoom_limits();
    assert!((max - fit * 4.0 * 4.0).abs() < 1e-9);
}

#[test]
fn test_invalid_zoom_is_ignored() {
    let mut view = fitted_view(800.0, 600.0);
    let scale = view.scale();
    assert_eq!(view.zoom_at_anchor(f64::NAN, Point::new(10.0, 10.0)), scale);
    assert_eq!(view.zoom_at_anchor(-2.0, Point::new(10.0, 10.0)), scale);
    assert_eq!(view.scale(), scale);
}

proptest! {
    #[test]
    fn prop_zoom_keeps_anchor_world_point(
        width in 200.0..2000.0f64,
        height in 200.0..2000.0f64,
        factor in 0.01..10.0f64,
        ax in 0.0..1.0f64,
        ay in 0.0..1.0f64,
        ox in -100.0..100.0f64,
        oy in -100.0..100.0f64,
    ) {
        let mut view = fitted_view(width, height);
        view.set_offset(Point::new(ox, oy));
        let anchor = Point::new(ax * width, ay * height);
        let before = view.screen_to_world(anchor);

        view.zoom_at_anchor(view.fit_scale() * factor, anchor);

        let after = view.screen_to_world(anchor);
        prop_assert!((before.x - after.x).abs() < 1e-6);
        prop_assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn prop_world_screen_round_trip(
        scale in 0.05..8.0f64,
        ox in -200.0..200.0f64,
        oy in -200.0..200.0f64,
        wx in -500.0..500.0f64,
        wy in -500.0..500.0f64,
    ) {
        let mut view = fitted_view(900.0, 600.0);
        view.restore(scale, Point::new(ox, oy));
        let world = Point::new(wx, wy);
        let back = view.screen_to_world(view.world_to_screen(world));
        prop_assert!((back.x - world.x).abs() < 1e-9);
        prop_assert!((back.y - world.y).abs() < 1e-9);
    }
}
