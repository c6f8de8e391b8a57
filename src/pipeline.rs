//! End-to-end generation: oscillators → schedules → viewport → geometry.
//!
//! Every call recomputes everything from the given [`Parameters`]; nothing is
//! cached between calls, and identical inputs give identical outputs.

use serde::Serialize;
use thiserror::Error;

use crate::geom::{
    ControlPointOptions, CurveSegment, DEFAULT_LOOK_AHEAD, DEFAULT_TANGENT_STRENGTH,
    DEFAULT_TENSION, FitCurveDiagnostics, Point2, fit_curve_with_diagnostics,
};
use crate::motion::{GenerateError, Oscillator, PointCount, SampledPoint, generate_points};
use crate::render::{Geometry, RenderMode, Viewport, produce_geometry};
use crate::schedule::{Property, PropertySchedule, ScheduleError, ScheduleOutcome, apply_schedules};

pub const DEFAULT_POINT_COUNT: usize = 1000;
pub const DEFAULT_TIME_START: f64 = 0.0;
pub const DEFAULT_TIME_END: f64 = 10.0;

/// Result type for [`generate`].
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Everything a generation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub oscillators: Vec<Oscillator>,
    pub time_start: f64,
    pub time_end: f64,
    pub point_count: usize,
    pub render_mode: RenderMode,
    pub schedules: Vec<PropertySchedule>,
}

impl Parameters {
    /// Schedule for `property`, if any. The last one wins when several exist.
    #[must_use]
    pub fn schedule(&self, property: Property) -> Option<&PropertySchedule> {
        self.schedules.iter().rev().find(|s| s.property == property)
    }

    /// Replace every schedule for the same property with `schedule`.
    pub fn set_schedule(&mut self, schedule: PropertySchedule) {
        self.schedules.retain(|s| s.property != schedule.property);
        self.schedules.push(schedule);
        self.schedules.sort_by_key(|s| s.property);
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            oscillators: vec![Oscillator::default()],
            time_start: DEFAULT_TIME_START,
            time_end: DEFAULT_TIME_END,
            point_count: DEFAULT_POINT_COUNT,
            render_mode: RenderMode::Line,
            schedules: Vec::new(),
        }
    }
}

/// Smoothing constants for both Bézier fitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveOptions {
    /// Tension of the batch fitter.
    pub tension: f64,
    /// Per-point fitter settings used for line geometry.
    pub control: ControlPointOptions,
}

impl CurveOptions {
    #[must_use]
    pub const fn new(tension: f64, control: ControlPointOptions) -> Self {
        Self { tension, control }
    }

    #[must_use]
    pub const fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    #[must_use]
    pub const fn with_tangent_strength(mut self, tangent_strength: f64) -> Self {
        self.control.tangent_strength = tangent_strength;
        self
    }

    #[must_use]
    pub const fn with_look_ahead(mut self, look_ahead: usize) -> Self {
        self.control.look_ahead = look_ahead;
        self
    }
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self::new(
            DEFAULT_TENSION,
            ControlPointOptions::new(DEFAULT_TANGENT_STRENGTH, DEFAULT_LOOK_AHEAD),
        )
    }
}

/// Options for [`generate`] that are not part of the persisted parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub curve: CurveOptions,
    /// Drawing area the points are scaled into; `None` keeps raw coordinates.
    pub viewport: Option<Viewport>,
}

impl PipelineOptions {
    #[must_use]
    pub const fn new(curve: CurveOptions, viewport: Option<Viewport>) -> Self {
        Self { curve, viewport }
    }

    #[must_use]
    pub const fn with_viewport(mut self, viewport: Option<Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub const fn with_curve(mut self, curve: CurveOptions) -> Self {
        self.curve = curve;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(CurveOptions::default(), Some(Viewport::default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedSchedule {
    pub property: Property,
    pub outcome: ScheduleOutcome,
}

/// Diagnostics for [`generate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDiagnostics {
    /// Point count asked for.
    pub requested_points: usize,
    /// Point count actually generated.
    pub point_count: usize,
    /// Whether the request exceeded the point ceiling and was clamped.
    pub clamped: bool,
    /// Schedules considered for the render mode, in application order.
    pub schedules: Vec<AppliedSchedule>,
    /// Segments (line mode) or objects (object mode) produced.
    pub primitive_count: usize,
}

/// Output of [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Points with attached properties, in viewport coordinates when a
    /// viewport was given.
    pub points: Vec<SampledPoint>,
    pub geometry: Geometry,
    pub diagnostics: GenerationDiagnostics,
}

impl Generation {
    /// Batch Bézier fit of the generated points.
    #[must_use]
    pub fn fitted_curve(&self, options: &CurveOptions) -> (Vec<CurveSegment>, FitCurveDiagnostics) {
        let positions: Vec<Point2> = self.points.iter().map(SampledPoint::position).collect();
        fit_curve_with_diagnostics(&positions, options.tension)
    }
}

/// Run the full pipeline for `parameters`.
///
/// A point count above [`crate::motion::MAX_POINTS`] is clamped rather than
/// rejected; [`GenerationDiagnostics::clamped`] reports it. Only schedules for
/// properties used by the render mode are applied.
pub fn generate(parameters: &Parameters, options: &PipelineOptions) -> PipelineResult<Generation> {
    let count = PointCount::clamped(parameters.point_count);
    if count.was_clamped() {
        log::warn!(
            "point count {} exceeds the maximum, clamped to {}",
            count.requested,
            count.effective
        );
    }

    let mut points = generate_points(
        &parameters.oscillators,
        parameters.time_start,
        parameters.time_end,
        count.effective,
    )?;

    let mode = parameters.render_mode;
    let schedules = apply_schedules(
        &mut points,
        parameters
            .schedules
            .iter()
            .filter(|s| mode.properties().contains(&s.property)),
    )?
    .into_iter()
    .map(|(property, outcome)| AppliedSchedule { property, outcome })
    .collect();

    if let Some(viewport) = options.viewport {
        viewport.fit(&mut points);
    }

    let geometry = produce_geometry(&points, mode, options.curve.control);
    log::debug!(
        "generated {} points, {} {} primitives",
        points.len(),
        geometry.len(),
        mode.name()
    );

    let diagnostics = GenerationDiagnostics {
        requested_points: count.requested,
        point_count: count.effective,
        clamped: count.was_clamped(),
        schedules,
        primitive_count: geometry.len(),
    };

    Ok(Generation {
        points,
        geometry,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MAX_POINTS;
    use crate::schedule::Color;

    #[test]
    fn default_parameters_generate_line_geometry() {
        let generation = generate(&Parameters::default(), &PipelineOptions::default()).unwrap();
        assert_eq!(generation.points.len(), DEFAULT_POINT_COUNT);
        assert_eq!(generation.geometry.mode(), RenderMode::Line);
        assert_eq!(generation.diagnostics.primitive_count, DEFAULT_POINT_COUNT - 1);
        assert!(!generation.diagnostics.clamped);
    }

    #[test]
    fn oversized_point_count_is_clamped() {
        let parameters = Parameters {
            point_count: MAX_POINTS + 5,
            render_mode: RenderMode::Object,
            ..Parameters::default()
        };
        let generation = generate(&parameters, &PipelineOptions::default()).unwrap();
        assert!(generation.diagnostics.clamped);
        assert_eq!(generation.diagnostics.requested_points, MAX_POINTS + 5);
        assert_eq!(generation.points.len(), MAX_POINTS);
    }

    #[test]
    fn schedules_outside_render_mode_are_ignored() {
        let mut parameters = Parameters {
            point_count: 10,
            ..Parameters::default()
        };
        parameters.set_schedule(PropertySchedule::new(Property::Height).with_keyframe(0.0, 9.0));
        parameters.set_schedule(
            PropertySchedule::new(Property::Color).with_keyframe(0.0, Color::rgb(1, 2, 3)),
        );

        let generation = generate(&parameters, &PipelineOptions::default()).unwrap();
        assert_eq!(generation.diagnostics.schedules.len(), 1);
        assert_eq!(generation.diagnostics.schedules[0].property, Property::Color);
        assert!(generation.points.iter().all(|p| p.height.is_none()));
        assert!(generation.points.iter().all(|p| p.color == Some(Color::rgb(1, 2, 3))));
    }

    #[test]
    fn invalid_input_is_reported() {
        let parameters = Parameters {
            oscillators: Vec::new(),
            ..Parameters::default()
        };
        assert_eq!(
            generate(&parameters, &PipelineOptions::default()),
            Err(PipelineError::Generate(GenerateError::NoOscillators))
        );

        let mut parameters = Parameters::default();
        parameters.set_schedule(PropertySchedule::new(Property::Opacity).with_repeat_count(0.5));
        assert!(matches!(
            generate(&parameters, &PipelineOptions::default()),
            Err(PipelineError::Schedule(ScheduleError::InvalidRepeatCount { .. }))
        ));
    }

    #[test]
    fn viewport_is_optional() {
        let parameters = Parameters {
            point_count: 5,
            time_end: 1.0,
            ..Parameters::default()
        };
        let raw = generate(&parameters, &PipelineOptions::default().with_viewport(None)).unwrap();
        assert!(raw.points[0].x.abs() < 1e-12);

        let scaled = generate(&parameters, &PipelineOptions::default()).unwrap();
        assert!(scaled.points.iter().all(|p| p.x >= 50.0 - 1e-9 && p.x <= 750.0 + 1e-9));
    }

    #[test]
    fn fitted_curve_uses_tension() {
        let parameters = Parameters {
            point_count: 20,
            ..Parameters::default()
        };
        let generation = generate(&parameters, &PipelineOptions::default()).unwrap();
        let (segments, diagnostics) = generation.fitted_curve(&CurveOptions::default().with_tension(2.0));
        assert_eq!(segments.len(), 16);
        assert_eq!(diagnostics.tension, 1.0);
    }
}
