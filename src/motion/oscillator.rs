//! Damped sinusoidal oscillators ("pendulums") and their superposition into a
//! sampled 2-D curve.
//!
//! Every oscillator contributes
//!
//! ```text
//! magnitude * exp(-damping_rate * t) * sin(2π * frequency * t + phase)
//! ```
//!
//! to `x`, `y` or both. The curve is sampled at uniform time steps.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::Point2;
use crate::schedule::{Color, Property};

/// Largest number of points a single generation produces.
pub const MAX_POINTS: usize = 60_000;
/// Smallest number of points a generation accepts.
pub const MIN_POINTS: usize = 2;

/// Result type for point generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Inputs the oscillator engine refuses to sample.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateError {
    #[error("at least one oscillator is required")]
    NoOscillators,
    #[error("at least {MIN_POINTS} points are required, got {0}")]
    TooFewPoints(usize),
    #[error("time end ({end}) must be greater than time start ({start})")]
    InvalidTimeWindow { start: f64, end: f64 },
    #[error("oscillator {index} has a non-finite or out-of-range parameter")]
    InvalidOscillator { index: usize },
}

/// A damped sinusoidal signal source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oscillator {
    pub frequency: f64,
    pub magnitude: f64,
    pub phase_radians: f64,
    pub damping_rate: f64,
    pub affects_x: bool,
    pub affects_y: bool,
}

impl Oscillator {
    /// Undamped oscillator with zero phase acting on both axes.
    #[must_use]
    pub const fn new(frequency: f64, magnitude: f64) -> Self {
        Self {
            frequency,
            magnitude,
            phase_radians: 0.0,
            damping_rate: 0.0,
            affects_x: true,
            affects_y: true,
        }
    }

    #[must_use]
    pub const fn with_phase(mut self, phase_radians: f64) -> Self {
        self.phase_radians = phase_radians;
        self
    }

    #[must_use]
    pub const fn with_damping(mut self, damping_rate: f64) -> Self {
        self.damping_rate = damping_rate;
        self
    }

    #[must_use]
    pub const fn with_axes(mut self, affects_x: bool, affects_y: bool) -> Self {
        self.affects_x = affects_x;
        self.affects_y = affects_y;
        self
    }

    /// Displacement contributed at time `t`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        let amplitude = self.magnitude * (-self.damping_rate * t).exp();
        amplitude * (TAU * self.frequency * t + self.phase_radians).sin()
    }

    fn is_valid(&self) -> bool {
        self.frequency.is_finite()
            && self.frequency > 0.0
            && self.magnitude.is_finite()
            && self.phase_radians.is_finite()
            && self.damping_rate.is_finite()
            && self.damping_rate >= 0.0
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(1.0, 100.0)
    }
}

/// A point of the sampled curve plus the properties schedules attach to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledPoint {
    pub x: f64,
    pub y: f64,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Opacity fraction in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl SampledPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, index: usize) -> Self {
        Self {
            x,
            y,
            index,
            color: None,
            line_width: None,
            object_width: None,
            height: None,
            opacity: None,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Store a scalar property. Opacity is given as a transparency percentage
    /// and stored as the opacity fraction `(100 - value) / 100`. Color is not
    /// a scalar property and is ignored here.
    pub fn set_scalar(&mut self, property: Property, value: f64) {
        match property {
            Property::LineWidth => self.line_width = Some(value),
            Property::ObjectWidth => self.object_width = Some(value),
            Property::Height => self.height = Some(value),
            Property::Opacity => self.opacity = Some((100.0 - value) / 100.0),
            Property::Color => {}
        }
    }
}

/// Requested point count after applying the [`MAX_POINTS`] ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointCount {
    pub requested: usize,
    pub effective: usize,
}

impl PointCount {
    #[must_use]
    pub fn clamped(requested: usize) -> Self {
        Self {
            requested,
            effective: requested.min(MAX_POINTS),
        }
    }

    #[must_use]
    pub const fn was_clamped(&self) -> bool {
        self.effective != self.requested
    }
}

/// Sample the superposition of `oscillators` at `num_points` uniformly spaced
/// times from `time_start` to `time_end` inclusive.
///
/// Point `i` is taken at `t = time_start + i * dt` with
/// `dt = (time_end - time_start) / (num_points - 1)` and carries `index == i`.
pub fn generate_points(
    oscillators: &[Oscillator],
    time_start: f64,
    time_end: f64,
    num_points: usize,
) -> GenerateResult<Vec<SampledPoint>> {
    if oscillators.is_empty() {
        return Err(GenerateError::NoOscillators);
    }
    if num_points < MIN_POINTS {
        return Err(GenerateError::TooFewPoints(num_points));
    }
    if !time_start.is_finite() || !time_end.is_finite() || time_end <= time_start {
        return Err(GenerateError::InvalidTimeWindow {
            start: time_start,
            end: time_end,
        });
    }
    if let Some(index) = oscillators.iter().position(|osc| !osc.is_valid()) {
        return Err(GenerateError::InvalidOscillator { index });
    }

    let time_step = (time_end - time_start) / (num_points - 1) as f64;

    let points = (0..num_points)
        .map(|i| {
            let t = time_start + i as f64 * time_step;
            let (mut x, mut y) = (0.0, 0.0);
            for oscillator in oscillators {
                let value = oscillator.value_at(t);
                if oscillator.affects_x {
                    x += value;
                }
                if oscillator.affects_y {
                    y += value;
                }
            }
            SampledPoint::new(x, y, i)
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_input() {
        let osc = [Oscillator::default()];
        assert_eq!(generate_points(&[], 0.0, 1.0, 10), Err(GenerateError::NoOscillators));
        assert_eq!(generate_points(&osc, 0.0, 1.0, 1), Err(GenerateError::TooFewPoints(1)));
        assert!(matches!(
            generate_points(&osc, 1.0, 1.0, 10),
            Err(GenerateError::InvalidTimeWindow { .. })
        ));
        assert!(matches!(
            generate_points(&[Oscillator::default().with_damping(-1.0)], 0.0, 1.0, 10),
            Err(GenerateError::InvalidOscillator { index: 0 })
        ));
    }

    #[test]
    fn rejects_non_positive_frequency() {
        for frequency in [0.0, -2.0] {
            let oscillators = [Oscillator::default(), Oscillator::new(frequency, 10.0)];
            assert_eq!(
                generate_points(&oscillators, 0.0, 1.0, 10),
                Err(GenerateError::InvalidOscillator { index: 1 })
            );
        }
    }

    #[test]
    fn samples_single_oscillator() {
        let points = generate_points(&[Oscillator::new(1.0, 100.0)], 0.0, 1.0, 5).unwrap();
        assert_eq!(points.len(), 5);
        for (i, point) in points.iter().enumerate() {
            let t = i as f64 * 0.25;
            let expected = 100.0 * (TAU * t).sin();
            assert_eq!(point.index, i);
            assert!((point.x - expected).abs() < 1e-9);
            assert!((point.y - expected).abs() < 1e-9);
        }
        assert_eq!(points[0].x, 0.0);
        assert_eq!(points[0].y, 0.0);
    }

    #[test]
    fn axes_are_respected() {
        let oscillators = [
            Oscillator::new(1.0, 10.0).with_axes(true, false),
            Oscillator::new(1.0, 10.0)
                .with_phase(std::f64::consts::FRAC_PI_2)
                .with_axes(false, true),
        ];
        let points = generate_points(&oscillators, 0.0, 1.0, 9).unwrap();
        for point in &points {
            // x = 10 sin, y = 10 cos -> circle of radius 10
            assert!((point.x.hypot(point.y) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn damping_decays_amplitude() {
        let osc = Oscillator::new(1.0, 100.0).with_phase(std::f64::consts::FRAC_PI_2).with_damping(0.5);
        assert!((osc.value_at(0.0) - 100.0).abs() < 1e-9);
        assert!((osc.value_at(2.0) - 100.0 * (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn point_count_is_clamped() {
        let count = PointCount::clamped(75_000);
        assert_eq!(count.effective, MAX_POINTS);
        assert!(count.was_clamped());
        assert!(!PointCount::clamped(500).was_clamped());
    }

    #[test]
    fn opacity_is_stored_as_fraction() {
        let mut point = SampledPoint::new(0.0, 0.0, 0);
        point.set_scalar(Property::Opacity, 40.0);
        assert_eq!(point.opacity, Some(0.6));
    }
}
