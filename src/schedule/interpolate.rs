//! Keyframe interpolation over single-span and looping domains.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use super::color::Color;
use super::keyframe::{
    KeyframeValue, Property, PropertySchedule, ResolvedKeyframe, ScheduleDomain, ScheduleResult,
};
use crate::motion::SampledPoint;

/// Linear interpolation between two values of the same kind.
pub trait Lerp: Clone {
    #[must_use]
    fn lerp(&self, other: &Self, amount: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, amount: f64) -> Self {
        self + (other - self) * amount
    }
}

impl Lerp for Color {
    fn lerp(&self, other: &Self, amount: f64) -> Self {
        Color::lerp(self, other, amount)
    }
}

/// Interpolated value at `position`.
///
/// `keyframes` must be sorted by index. With no keyframes the result is
/// `None`; with one keyframe it is that keyframe's value everywhere.
///
/// A `repeat_count` of exactly 1 blends only the first and last keyframe over
/// `[0, total_points - 1]`; intermediate keyframes are not consulted.
///
/// Any other repeat count treats the keyframes as a ring of `loop_length`
/// points: the value is blended between the last keyframe at or before the
/// query and the first keyframe after it, wrapping around the ring when the
/// query lies before the first or after the last keyframe.
pub fn value_at<T, F>(
    position: i64,
    keyframes: &[ResolvedKeyframe<T>],
    loop_length: usize,
    lerp: F,
    repeat_count: f64,
    total_points: usize,
) -> Option<T>
where
    T: Clone,
    F: Fn(&T, &T, f64) -> T,
{
    let first = keyframes.first()?;
    let last = keyframes.last()?;
    if keyframes.len() == 1 {
        return Some(first.value.clone());
    }

    if repeat_count == 1.0 {
        let progress = if total_points > 1 {
            position as f64 / (total_points - 1) as f64
        } else {
            0.0
        };
        return Some(lerp(&first.value, &last.value, progress));
    }

    if loop_length == 0 {
        return None;
    }
    let loop_length = loop_length as i64;
    let query = position.rem_euclid(loop_length);

    let start = keyframes.iter().rev().find(|k| k.index <= query);
    let end = keyframes.iter().find(|k| k.index > query);
    let (start, end) = match (start, end) {
        (None, _) => (last, first),
        (Some(start), None) => (start, first),
        (Some(start), Some(end)) => (start, end),
    };

    let (range, offset) = if start.index > end.index {
        let offset = if query >= start.index {
            query - start.index
        } else {
            query + (loop_length - start.index)
        };
        (loop_length - start.index + end.index, offset)
    } else {
        (end.index - start.index, query - start.index)
    };

    if range == 0 {
        return Some(start.value.clone());
    }
    Some(lerp(&start.value, &end.value, offset as f64 / range as f64))
}

/// [`value_at`] using the value type's own [`Lerp`].
pub fn value_at_lerp<T: Lerp>(
    position: i64,
    keyframes: &[ResolvedKeyframe<T>],
    loop_length: usize,
    repeat_count: f64,
    total_points: usize,
) -> Option<T> {
    value_at(
        position,
        keyframes,
        loop_length,
        T::lerp,
        repeat_count,
        total_points,
    )
}

/// Evaluates one schedule for every output point index.
#[derive(Debug, Clone)]
pub struct ScheduleEvaluator<T> {
    keyframes: Vec<ResolvedKeyframe<T>>,
    domain: ScheduleDomain,
    offset_points: i64,
    repeat_count: f64,
}

impl<T: Lerp> ScheduleEvaluator<T> {
    /// Resolve `schedule` against a curve of `total_points` points.
    pub fn new<F>(schedule: &PropertySchedule, total_points: usize, extract: F) -> Self
    where
        F: Fn(&KeyframeValue) -> Option<T>,
    {
        let domain = schedule.domain(total_points);
        Self {
            keyframes: schedule.resolve(total_points, extract),
            offset_points: domain.offset_points(schedule.offset_percent),
            domain,
            repeat_count: schedule.repeat_count,
        }
    }

    #[must_use]
    pub fn keyframes(&self) -> &[ResolvedKeyframe<T>] {
        &self.keyframes
    }

    /// Value for output point `index`, after offset and clamping/wrapping.
    #[must_use]
    pub fn evaluate(&self, index: usize) -> Option<T> {
        let position = self.domain.effective_index(index, self.offset_points);
        value_at_lerp(
            position,
            &self.keyframes,
            self.domain.length(),
            self.repeat_count,
            self.domain.total_points,
        )
    }
}

/// Outcome of applying one schedule to a point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleOutcome {
    /// Values were written to every point.
    Applied,
    /// The schedule has no keyframes; points were left untouched.
    NoKeyframes,
    /// The loop length rounded to zero; points were left untouched.
    EmptyLoop,
}

/// Evaluate `schedule` for every point and store the result on the point.
///
/// Opacity keyframes hold a transparency percentage; the stored value is
/// `(100 - transparency) / 100`.
pub fn apply_schedule(
    points: &mut [SampledPoint],
    schedule: &PropertySchedule,
) -> ScheduleResult<ScheduleOutcome> {
    schedule.validate()?;

    if schedule.keyframes.is_empty() {
        return Ok(ScheduleOutcome::NoKeyframes);
    }
    let total_points = points.len();
    if schedule.loop_length(total_points) == Some(0) {
        log::warn!(
            "{} schedule skipped: repeat count {} leaves an empty loop for {} points",
            schedule.property,
            schedule.repeat_count,
            total_points
        );
        return Ok(ScheduleOutcome::EmptyLoop);
    }

    let property = schedule.property;
    if property.is_color() {
        let evaluator = ScheduleEvaluator::new(schedule, total_points, |value| match value {
            KeyframeValue::Color(color) => Some(color.clone()),
            KeyframeValue::Scalar(_) => None,
        });
        write_values(points, |point| {
            if let Some(color) = evaluator.evaluate(point.index) {
                point.color = Some(color);
            }
        });
    } else {
        let evaluator = ScheduleEvaluator::new(schedule, total_points, |value| match value {
            KeyframeValue::Scalar(scalar) => Some(*scalar),
            KeyframeValue::Color(_) => None,
        });
        write_values(points, |point| {
            if let Some(value) = evaluator.evaluate(point.index) {
                point.set_scalar(property, value);
            }
        });
    }

    log::debug!(
        "applied {} schedule ({} keyframes) to {} points",
        property,
        schedule.keyframes.len(),
        total_points
    );
    Ok(ScheduleOutcome::Applied)
}

/// Apply several schedules in order. Later schedules for the same property
/// overwrite earlier ones.
pub fn apply_schedules<'a, I>(
    points: &mut [SampledPoint],
    schedules: I,
) -> ScheduleResult<Vec<(Property, ScheduleOutcome)>>
where
    I: IntoIterator<Item = &'a PropertySchedule>,
{
    schedules
        .into_iter()
        .map(|schedule| apply_schedule(points, schedule).map(|outcome| (schedule.property, outcome)))
        .collect()
}

#[cfg(feature = "parallel")]
fn write_values<F>(points: &mut [SampledPoint], write: F)
where
    F: Fn(&mut SampledPoint) + Sync + Send,
{
    points.par_iter_mut().for_each(write);
}

#[cfg(not(feature = "parallel"))]
fn write_values<F>(points: &mut [SampledPoint], write: F)
where
    F: Fn(&mut SampledPoint),
{
    points.iter_mut().for_each(write);
}
