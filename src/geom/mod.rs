mod bezier;
mod core;
mod tangent;

pub use bezier::{
    ControlPair, ControlPointOptions, CurveSegment, DEFAULT_LOOK_AHEAD, DEFAULT_TANGENT_STRENGTH,
    DEFAULT_TENSION, FitCurveDiagnostics, SmoothSpan,
    bezier_path_data, control_points, fit_curve, fit_curve_with_diagnostics, smooth_segments,
    span_path_data,
};
pub use core::{BBox2, Point2, Tolerance, Vec2};
pub use tangent::{WIDE_TANGENT_MIN_POINTS, distance, weighted_tangent, wide_tangents};

#[cfg(test)]
mod tests;
