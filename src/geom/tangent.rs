//! Tangent estimation on sampled polylines.
//!
//! Two estimators live here and they are intentionally kept apart:
//!
//! - [`wide_tangents`] looks two points back and two points ahead and is used
//!   by the batch fitter ([`crate::geom::fit_curve`]).
//! - [`weighted_tangent`] averages forward/backward differences over a
//!   configurable look-ahead with `1/offset` weights and is used by the
//!   per-segment fitter ([`crate::geom::control_points`]).
//!
//! They disagree at the boundaries; merging them changes the rendered curve.

use super::core::{Point2, Vec2};

/// Minimum number of points for the wide-neighborhood estimator.
pub const WIDE_TANGENT_MIN_POINTS: usize = 5;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point2, b: Point2) -> f64 {
    a.distance_to(b)
}

/// Unit tangents using two neighbours on each side.
///
/// Interior points (`2..n-2`) use `(p[i+2] - p[i-2]) * 0.5 + (p[i+1] - p[i-1])`.
/// The first two and last two points fall back to forward/backward
/// differences over the available neighbours. A zero-length direction yields
/// `None` for that point.
///
/// Returns an empty vector when fewer than [`WIDE_TANGENT_MIN_POINTS`] points
/// are given.
#[must_use]
pub fn wide_tangents(points: &[Point2]) -> Vec<Option<Vec2>> {
    let n = points.len();
    if n < WIDE_TANGENT_MIN_POINTS {
        return Vec::new();
    }

    let mut tangents = vec![None; n];

    for i in 2..n - 2 {
        let wide = points[i + 2] - points[i - 2];
        let near = points[i + 1] - points[i - 1];
        tangents[i] = (wide * 0.5 + near).normalized();
    }

    tangents[0] = (points[1] - points[0]).normalized();
    tangents[1] = (points[2] - points[0]).normalized();
    tangents[n - 2] = (points[n - 1] - points[n - 3]).normalized();
    tangents[n - 1] = (points[n - 1] - points[n - 2]).normalized();

    tangents
}

/// Weighted tangent at `index`, not normalized.
///
/// For `offset` in `1..=look_ahead` the forward difference
/// `p[index+offset] - p[index]` and backward difference
/// `p[index] - p[index-offset]` are accumulated with weight `1/offset` when the
/// neighbour exists, then divided by the total weight. The first and last
/// point use the plain forward/backward difference instead.
///
/// # Panics
/// Panics if `index` is out of bounds.
#[must_use]
pub fn weighted_tangent(points: &[Point2], index: usize, look_ahead: usize) -> Vec2 {
    let n = points.len();
    let point = points[index];

    if n > 1 && index == 0 {
        return points[1] - points[0];
    }
    if n > 1 && index == n - 1 {
        return points[index] - points[index - 1];
    }

    let mut tangent = Vec2::ZERO;
    let mut weight_sum = 0.0;

    for offset in 1..=look_ahead {
        let weight = 1.0 / offset as f64;

        if let Some(forward) = points.get(index + offset) {
            tangent = tangent + (*forward - point) * weight;
            weight_sum += weight;
        }

        if let Some(backward) = index.checked_sub(offset).map(|i| points[i]) {
            tangent = tangent + (point - backward) * weight;
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        tangent / weight_sum
    } else {
        tangent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f64, 2.0 * i as f64)).collect()
    }

    #[test]
    fn wide_tangents_need_five_points() {
        assert!(wide_tangents(&line(4)).is_empty());
        assert_eq!(wide_tangents(&line(5)).len(), 5);
    }

    #[test]
    fn wide_tangents_follow_a_straight_line() {
        let expected = Vec2::new(1.0, 2.0).normalized().unwrap();
        for tangent in wide_tangents(&line(8)) {
            let tangent = tangent.expect("non-degenerate");
            assert!((tangent.x - expected.x).abs() < 1e-12);
            assert!((tangent.y - expected.y).abs() < 1e-12);
        }
    }

    #[test]
    fn wide_tangents_mark_degenerate_points() {
        let points = vec![Point2::new(1.0, 1.0); 6];
        assert!(wide_tangents(&points).iter().all(Option::is_none));
    }

    #[test]
    fn weighted_tangent_uses_plain_differences_at_ends() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 5.0),
            Point2::new(3.0, 5.0),
        ];
        assert_eq!(weighted_tangent(&points, 0, 3), Vec2::new(1.0, 0.0));
        assert_eq!(weighted_tangent(&points, 3, 3), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn weighted_tangent_averages_interior_neighbours() {
        let points = line(7);
        // Six weighted terms of (1, 2) each, divided by 2 * (1 + 1/2 + 1/3).
        let tangent = weighted_tangent(&points, 3, 3);
        assert!((tangent.x - 18.0 / 11.0).abs() < 1e-12);
        assert!((tangent.y - 36.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_tangent_single_point_is_zero() {
        assert_eq!(weighted_tangent(&[Point2::new(4.0, 4.0)], 0, 3), Vec2::ZERO);
    }
}
