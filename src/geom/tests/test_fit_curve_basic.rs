use crate::geom::{
    CurveSegment, Point2, Tolerance, Vec2, fit_curve, fit_curve_with_diagnostics,
};

fn collinear(n: usize) -> Vec<Point2> {
    (0..n).map(|i| Point2::new(i as f64, i as f64 * 0.5)).collect()
}

fn on_line(origin: Point2, direction: Vec2, p: Point2) -> bool {
    direction.cross(p - origin).abs() < 1e-9
}

#[test]
fn fit_curve_needs_five_points() {
    assert!(fit_curve(&collinear(0), 0.4).is_empty());
    assert!(fit_curve(&collinear(4), 0.4).is_empty());
}

#[test]
fn fit_curve_five_collinear_points_gives_one_straight_segment() {
    let points = collinear(5);
    let segments = fit_curve(&points, 0.4);
    assert_eq!(segments.len(), 1);

    let segment = segments[0];
    assert_eq!(segment.start, points[2]);
    assert_eq!(segment.end, points[3]);

    let direction = points[4] - points[0];
    for p in [segment.control1, segment.control2] {
        assert!(on_line(points[0], direction, p), "{p:?} not on the line");
    }
}

#[test]
fn fit_curve_skips_spans_near_the_ends() {
    let points = collinear(10);
    let segments = fit_curve(&points, 0.4);
    assert_eq!(segments.len(), 6);
    assert_eq!(segments.first().map(|s| s.start), Some(points[2]));
    assert_eq!(segments.last().map(|s| s.end), Some(points[8]));
}

#[test]
fn fit_curve_six_points_includes_last_interior_span() {
    let points = collinear(6);
    let segments = fit_curve(&points, 0.4);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].start, points[3]);
    assert_eq!(segments[1].end, points[4]);
}

#[test]
fn fit_curve_control_distance_scales_with_tension() {
    let points = collinear(6);
    let tol = Tolerance::new(1e-9);
    let segment_length = points[2].distance_to(points[3]);

    let segment = fit_curve(&points, 0.25)[0];
    assert!(tol.approx_eq_f64(
        segment.start.distance_to(segment.control1),
        segment_length * 0.25
    ));
    assert!(tol.approx_eq_f64(
        segment.end.distance_to(segment.control2),
        segment_length * 0.25
    ));
}

#[test]
fn fit_curve_clamps_tension() {
    let points = collinear(6);
    let (high, diagnostics) = fit_curve_with_diagnostics(&points, 3.0);
    assert_eq!(diagnostics.tension, 1.0);
    assert_eq!(high, fit_curve(&points, 1.0));

    let (low, diagnostics) = fit_curve_with_diagnostics(&points, -1.0);
    assert_eq!(diagnostics.tension, 0.0);
    assert_eq!(low[0].control1, low[0].start);
    assert_eq!(low[0].control2, low[0].end);
}

#[test]
fn fit_curve_falls_back_to_straight_segments_on_degenerate_tangents() {
    let points = vec![Point2::new(2.0, 2.0); 7];
    let (segments, diagnostics) = fit_curve_with_diagnostics(&points, 0.4);
    assert_eq!(segments.len(), 3);
    assert_eq!(diagnostics.straight_fallbacks, 3);
    assert!(segments
        .iter()
        .all(|s| *s == CurveSegment::straight(s.start, s.end)));
}

#[test]
fn fit_curve_is_deterministic() {
    let points: Vec<Point2> = (0..40)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            Point2::new(t.sin() * 50.0, (t * 1.5).cos() * 30.0)
        })
        .collect();
    assert_eq!(fit_curve(&points, 0.4), fit_curve(&points, 0.4));
}

#[test]
fn curve_segment_endpoints_are_interpolated() {
    let segment = CurveSegment::new(
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 2.0),
        Point2::new(3.0, 2.0),
        Point2::new(4.0, 0.0),
    );
    assert_eq!(segment.point_at(0.0), segment.start);
    assert_eq!(segment.point_at(1.0), segment.end);
    assert_eq!(segment.point_at(0.5), Point2::new(2.0, 1.5));
}
