//! Cubic Bézier fitting through sampled points.
//!
//! [`fit_curve`] is the offline batch fitter; [`control_points`] and
//! [`smooth_segments`] are the per-point fitter used while producing line
//! geometry. See [`super::tangent`] for the estimators behind them.

use std::fmt::Write as _;

use serde::Serialize;

use super::core::{Point2, Tolerance, Vec2};
use super::tangent::{WIDE_TANGENT_MIN_POINTS, distance, weighted_tangent, wide_tangents};

/// Default tension for [`fit_curve`].
pub const DEFAULT_TENSION: f64 = 0.4;
/// Default tangent strength for [`control_points`].
pub const DEFAULT_TANGENT_STRENGTH: f64 = 0.3;
/// Default look-ahead of the weighted tangent used by [`control_points`].
pub const DEFAULT_LOOK_AHEAD: usize = 3;

/// A cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSegment {
    pub start: Point2,
    pub end: Point2,
    pub control1: Point2,
    pub control2: Point2,
}

impl CurveSegment {
    #[must_use]
    pub const fn new(start: Point2, control1: Point2, control2: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            control1,
            control2,
        }
    }

    /// A segment whose control points sit on its endpoints, i.e. a straight line.
    #[must_use]
    pub const fn straight(start: Point2, end: Point2) -> Self {
        Self::new(start, start, end, end)
    }

    /// Evaluate the segment at `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point2::new(
            b0 * self.start.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.end.y,
        )
    }
}

/// Incoming and outgoing control points around an anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPair {
    /// Incoming control point (`anchor - tangent * distance`).
    pub cp1: Point2,
    /// Outgoing control point (`anchor + tangent * distance`).
    pub cp2: Point2,
}

/// Options for the per-point fitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPointOptions {
    /// Fraction of the average neighbour distance used as control distance.
    pub tangent_strength: f64,
    /// Number of neighbours on each side feeding the weighted tangent.
    pub look_ahead: usize,
}

impl ControlPointOptions {
    #[must_use]
    pub const fn new(tangent_strength: f64, look_ahead: usize) -> Self {
        Self {
            tangent_strength,
            look_ahead,
        }
    }
}

impl Default for ControlPointOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TANGENT_STRENGTH, DEFAULT_LOOK_AHEAD)
    }
}

/// Diagnostics for [`fit_curve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitCurveDiagnostics {
    /// Number of input points.
    pub input_point_count: usize,
    /// Number of segments produced.
    pub segment_count: usize,
    /// Segments that fell back to a straight line because a tangent was degenerate.
    pub straight_fallbacks: usize,
    /// Tension after clamping to `[0, 1]`.
    pub tension: f64,
}

/// Fit cubic Bézier segments through `points` using the wide-neighborhood
/// tangents.
///
/// Requires at least five points, otherwise no segments are produced.
/// Segments are emitted for the spans starting at `i` in `[2, n-3]`; the spans
/// near the ends where the estimator lacks neighbours are skipped. The last
/// span `n-3 -> n-2` is included, so five points give one segment and six give
/// two (a `[2, n-4]` range would give zero and one). Control
/// points are placed at `segment_length * tension` along the tangents, with
/// `tension` clamped to `[0, 1]`. A span touching a degenerate tangent becomes
/// a straight segment.
#[must_use]
pub fn fit_curve(points: &[Point2], tension: f64) -> Vec<CurveSegment> {
    fit_curve_with_diagnostics(points, tension).0
}

/// [`fit_curve`] returning diagnostics as well.
#[must_use]
pub fn fit_curve_with_diagnostics(
    points: &[Point2],
    tension: f64,
) -> (Vec<CurveSegment>, FitCurveDiagnostics) {
    let tension = if tension.is_nan() {
        DEFAULT_TENSION
    } else {
        tension.clamp(0.0, 1.0)
    };
    let mut diagnostics = FitCurveDiagnostics {
        input_point_count: points.len(),
        tension,
        ..Default::default()
    };

    let n = points.len();
    if n < WIDE_TANGENT_MIN_POINTS {
        return (Vec::new(), diagnostics);
    }

    let tangents = wide_tangents(points);
    let mut segments = Vec::with_capacity(n - 4);

    for i in 2..n - 2 {
        let p0 = points[i];
        let p1 = points[i + 1];

        let segment = match (tangents[i], tangents[i + 1]) {
            (Some(t0), Some(t1)) => {
                let scale = distance(p0, p1) * tension;
                CurveSegment::new(p0, p0 + t0 * scale, p1 - t1 * scale, p1)
            }
            _ => {
                diagnostics.straight_fallbacks += 1;
                CurveSegment::straight(p0, p1)
            }
        };
        segments.push(segment);
    }

    diagnostics.segment_count = segments.len();
    (segments, diagnostics)
}

/// Symmetric control points around `points[index]` from the weighted tangent.
///
/// The control distance is `tangent_strength` times the mean of the distances
/// to the previous and next point (or whichever is available/non-zero). Returns
/// `None` when fewer than two points are given or the tangent has zero length;
/// callers then draw a straight line for the affected span.
///
/// # Panics
/// Panics if `index` is out of bounds.
#[must_use]
pub fn control_points(
    points: &[Point2],
    index: usize,
    options: ControlPointOptions,
) -> Option<ControlPair> {
    if points.len() < 2 {
        return None;
    }

    let point = points[index];
    let tangent = weighted_tangent(points, index, options.look_ahead);

    let prev_distance = index
        .checked_sub(1)
        .map_or(0.0, |prev| distance(points[prev], point));
    let next_distance = points
        .get(index + 1)
        .map_or(0.0, |next| distance(point, *next));

    let zero = Tolerance::ZERO_LENGTH;
    let divisor = if !zero.is_zero_length(prev_distance) && !zero.is_zero_length(next_distance) {
        2.0
    } else {
        1.0
    };
    let control_distance = (prev_distance + next_distance) / divisor * options.tangent_strength;

    let unit: Vec2 = tangent.normalized()?;
    Some(ControlPair {
        cp1: point - unit * control_distance,
        cp2: point + unit * control_distance,
    })
}

/// Shape of one span produced by [`smooth_segments`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothSpan {
    Curve(CurveSegment),
    Line { start: Point2, end: Point2 },
}

impl SmoothSpan {
    #[must_use]
    pub const fn start(&self) -> Point2 {
        match self {
            Self::Curve(segment) => segment.start,
            Self::Line { start, .. } => *start,
        }
    }

    #[must_use]
    pub const fn end(&self) -> Point2 {
        match self {
            Self::Curve(segment) => segment.end,
            Self::Line { end, .. } => *end,
        }
    }
}

/// One span per consecutive point pair, smoothed with [`control_points`].
///
/// The outgoing control point of `points[i]` and the incoming control point
/// of `points[i + 1]` shape span `i`; if either is unavailable the span is a
/// straight line.
#[must_use]
pub fn smooth_segments(points: &[Point2], options: ControlPointOptions) -> Vec<SmoothSpan> {
    if points.len() < 2 {
        return Vec::new();
    }

    let controls: Vec<Option<ControlPair>> = (0..points.len())
        .map(|index| control_points(points, index, options))
        .collect();

    points
        .windows(2)
        .zip(controls.windows(2))
        .map(|(pair, ctrl)| match (ctrl[0], ctrl[1]) {
            (Some(current), Some(next)) => {
                SmoothSpan::Curve(CurveSegment::new(pair[0], current.cp2, next.cp1, pair[1]))
            }
            _ => SmoothSpan::Line {
                start: pair[0],
                end: pair[1],
            },
        })
        .collect()
}

/// Single SVG path string (`M … C …`/`L …`) through all points.
#[must_use]
pub fn bezier_path_data(points: &[Point2], options: ControlPointOptions) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    if points.len() < 2 {
        return String::new();
    }

    let mut data = format!("M {} {}", first.x, first.y);
    for span in smooth_segments(points, options) {
        push_span_command(&mut data, &span);
    }
    data
}

/// Path string for a single span, starting with its own `M` command.
#[must_use]
pub fn span_path_data(span: &SmoothSpan) -> String {
    let start = span.start();
    let mut data = format!("M {} {}", start.x, start.y);
    push_span_command(&mut data, span);
    data
}

fn push_span_command(data: &mut String, span: &SmoothSpan) {
    // Writing into a String cannot fail.
    let _ = match span {
        SmoothSpan::Curve(segment) => write!(
            data,
            " C {} {}, {} {}, {} {}",
            segment.control1.x,
            segment.control1.y,
            segment.control2.x,
            segment.control2.y,
            segment.end.x,
            segment.end.y
        ),
        SmoothSpan::Line { end, .. } => write!(data, " L {} {}", end.x, end.y),
    };
}
