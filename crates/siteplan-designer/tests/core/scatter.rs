use proptest::prelude::*;
use siteplan_core::tuning::ScatterLimits;
use siteplan_designer::geometry::point_in_polygon;
use siteplan_designer::scatter::{plan, scatter_points, ScatterRequest};
use siteplan_designer::Point;

fn rectangle(w: f64, h: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

fn request<'a>(id: &'a str, points: &'a [Point], density: f64, spacing: f64) -> ScatterRequest<'a> {
    ScatterRequest {
        polygon_id: id,
        points,
        density_percent: density,
        min_spacing_m: spacing,
        footprint_area_m2: 1.0,
        average_scale: 1.0,
    }
}

#[test]
fn test_plan_matches_formula() {
    let points = rectangle(20.0, 10.0);
    let plan = plan(&request("p", &points, 50.0, 2.0), &ScatterLimits::default()).unwrap();
    // per instance = max(1, 4) = 4; capacity = 50; target = 25
    assert_eq!(plan.target, 25);
    assert_eq!(plan.min_distance, 2.0);
    assert_eq!(plan.max_attempts, 25 * 140);
}

#[test]
fn test_small_or_empty_requests_produce_nothing() {
    let limits = ScatterLimits::default();
    let tiny = rectangle(5.0, 5.0);
    assert!(scatter_points(&request("p", &tiny, 100.0, 0.0), &limits).is_empty());

    let field = rectangle(50.0, 50.0);
    assert!(scatter_points(&request("p", &field, 0.0, 1.0), &limits).is_empty());
}

#[test]
fn test_point_cap() {
    let field = rectangle(200.0, 200.0);
    let limits = ScatterLimits::default();
    let plan = plan(&request("p", &field, 100.0, 0.0), &limits).unwrap();
    assert_eq!(plan.target, 800);
    assert_eq!(plan.max_attempts, 60_000);
}

#[test]
fn test_configurable_limits() {
    let field = rectangle(50.0, 50.0);
    let limits = ScatterLimits {
        max_points: 10,
        ..ScatterLimits::default()
    };
    let points = scatter_points(&request("p", &field, 100.0, 1.0), &limits);
    assert_eq!(points.len(), 10);
}

#[test]
fn test_unbounded_limits_on_huge_polygon() {
    let field = rectangle(100_000.0, 100_000.0);
    let limits = ScatterLimits::unbounded_preview();
    let request = ScatterRequest {
        footprint_area_m2: 0.01,
        ..request("huge", &field, 100.0, 0.0)
    };

    let plan = plan(&request, &limits).unwrap();
    assert!(plan.target > 1_000_000_000);
    assert_eq!(plan.max_attempts, ScatterLimits::FINAL_PASS_MAX_ATTEMPTS);

    let points = scatter_points(&request, &limits);
    assert!(!points.is_empty());
    assert!(points.len() <= ScatterLimits::FINAL_PASS_MAX_ATTEMPTS);
}

#[test]
fn test_seed_depends_on_polygon_id() {
    let field = rectangle(30.0, 30.0);
    let limits = ScatterLimits::default();
    let a = scatter_points(&request("a", &field, 40.0, 1.5), &limits);
    let b = scatter_points(&request("b", &field, 40.0, 1.5), &limits);
    assert!(!a.is_empty());
    assert_ne!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_scatter_is_deterministic_and_spaced(
        w in 10.0..60.0f64,
        h in 10.0..60.0f64,
        density in 1.0..100.0f64,
        spacing in 0.5..4.0f64,
    ) {
        let field = rectangle(w, h);
        let limits = ScatterLimits::default();
        let req = request("poly-prop", &field, density, spacing);

        let first = scatter_points(&req, &limits);
        let second = scatter_points(&req, &limits);
        prop_assert_eq!(&first, &second);

        let Some(plan) = plan(&req, &limits) else {
            prop_assert!(first.is_empty());
            return Ok(());
        };
        prop_assert!(first.len() <= plan.target);
        for (i, p) in first.iter().enumerate() {
            prop_assert!(point_in_polygon(*p, &field));
            for q in &first[i + 1..] {
                prop_assert!(p.distance_to(q) >= plan.min_distance - 1e-9);
            }
        }
    }
}
