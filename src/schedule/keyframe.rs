//! Keyframes and per-property schedules.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::color::Color;

/// Result type for schedule validation and application.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Describes schedules that cannot be evaluated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("{property} schedule has invalid repeat count {repeat_count} (must be finite and >= 1)")]
    InvalidRepeatCount { property: Property, repeat_count: f64 },
    #[error("{property} schedule has a non-finite offset")]
    InvalidOffset { property: Property },
    #[error("{property} keyframe {index} has a non-finite position")]
    InvalidPosition { property: Property, index: usize },
    #[error("{property} keyframe {index} holds a {found} value, expected {expected}")]
    ValueTypeMismatch {
        property: Property,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Visual properties a schedule can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Color,
    LineWidth,
    ObjectWidth,
    Height,
    Opacity,
}

impl Property {
    pub const ALL: [Self; 5] = [
        Self::Color,
        Self::LineWidth,
        Self::ObjectWidth,
        Self::Height,
        Self::Opacity,
    ];

    /// Name used in settings documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::LineWidth => "lineWidth",
            Self::ObjectWidth => "objectWidth",
            Self::Height => "height",
            Self::Opacity => "opacity",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }

    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, Self::Color)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value stored in a keyframe.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyframeValue {
    Scalar(f64),
    Color(Color),
}

impl KeyframeValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Color(_) => "color",
        }
    }
}

impl From<f64> for KeyframeValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Color> for KeyframeValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

/// A value pinned at a percentage of the schedule's domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Position in `[0, 100]`.
    pub position_percent: f64,
    pub value: KeyframeValue,
}

impl Keyframe {
    #[must_use]
    pub fn new(position_percent: f64, value: impl Into<KeyframeValue>) -> Self {
        Self {
            position_percent,
            value: value.into(),
        }
    }
}

/// A keyframe whose position has been converted to an absolute point index.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedKeyframe<T> {
    pub index: i64,
    pub value: T,
}

impl<T> ResolvedKeyframe<T> {
    #[must_use]
    pub const fn new(index: i64, value: T) -> Self {
        Self { index, value }
    }
}

/// Keyframe schedule for a single property.
///
/// A repeat count of exactly 1 spans the whole curve once; anything larger
/// repeats the keyframes over loops of `round(total_points / repeat_count)`
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchedule {
    pub property: Property,
    pub repeat_count: f64,
    pub offset_percent: f64,
    pub keyframes: Vec<Keyframe>,
}

impl PropertySchedule {
    #[must_use]
    pub fn new(property: Property) -> Self {
        Self {
            property,
            repeat_count: 1.0,
            offset_percent: 0.0,
            keyframes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeat_count(mut self, repeat_count: f64) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    #[must_use]
    pub fn with_offset_percent(mut self, offset_percent: f64) -> Self {
        self.offset_percent = offset_percent;
        self
    }

    #[must_use]
    pub fn with_keyframe(mut self, position_percent: f64, value: impl Into<KeyframeValue>) -> Self {
        self.keyframes.push(Keyframe::new(position_percent, value));
        self
    }

    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.repeat_count != 1.0
    }

    /// Loop length in points, or `None` when the schedule does not loop.
    #[must_use]
    pub fn loop_length(&self, total_points: usize) -> Option<usize> {
        if !self.is_cyclic() {
            return None;
        }
        let length = (total_points as f64 / self.repeat_count).round();
        Some(if length.is_finite() && length > 0.0 {
            length as usize
        } else {
            0
        })
    }

    /// Domain the keyframes are resolved against.
    #[must_use]
    pub fn domain(&self, total_points: usize) -> ScheduleDomain {
        ScheduleDomain {
            total_points,
            loop_length: self.loop_length(total_points),
        }
    }

    /// Check repeat count, offset and keyframe positions/value types.
    pub fn validate(&self) -> ScheduleResult<()> {
        if !self.repeat_count.is_finite() || self.repeat_count < 1.0 {
            return Err(ScheduleError::InvalidRepeatCount {
                property: self.property,
                repeat_count: self.repeat_count,
            });
        }
        if !self.offset_percent.is_finite() {
            return Err(ScheduleError::InvalidOffset {
                property: self.property,
            });
        }

        let expected = if self.property.is_color() {
            "color"
        } else {
            "scalar"
        };

        for (index, keyframe) in self.keyframes.iter().enumerate() {
            if !keyframe.position_percent.is_finite() {
                return Err(ScheduleError::InvalidPosition {
                    property: self.property,
                    index,
                });
            }
            let found = keyframe.value.kind();
            if found != expected {
                return Err(ScheduleError::ValueTypeMismatch {
                    property: self.property,
                    index,
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Keyframe values sorted by position and resolved to absolute indices.
    ///
    /// `extract` maps each keyframe value to the interpolated type; keyframes
    /// it rejects are skipped. In non-looping schedules synthetic keyframes
    /// are added at index 0 and at the last index when missing, copying the
    /// first and last values.
    pub fn resolve<T, F>(&self, total_points: usize, extract: F) -> Vec<ResolvedKeyframe<T>>
    where
        T: Clone,
        F: Fn(&KeyframeValue) -> Option<T>,
    {
        let domain = self.domain(total_points);
        let mut sorted: Vec<&Keyframe> = self.keyframes.iter().collect();
        sorted.sort_by(|a, b| a.position_percent.total_cmp(&b.position_percent));

        let mut resolved: Vec<ResolvedKeyframe<T>> = sorted
            .into_iter()
            .filter_map(|keyframe| {
                let value = extract(&keyframe.value)?;
                Some(ResolvedKeyframe::new(
                    domain.index_for_percent(keyframe.position_percent),
                    value,
                ))
            })
            .collect();

        if domain.loop_length.is_none() && !resolved.is_empty() {
            if !resolved.iter().any(|k| k.index == 0) {
                let value = resolved[0].value.clone();
                resolved.insert(0, ResolvedKeyframe::new(0, value));
            }
            let last_index = domain.last_index();
            if !resolved.iter().any(|k| k.index == last_index) {
                let value = resolved[resolved.len() - 1].value.clone();
                resolved.push(ResolvedKeyframe::new(last_index, value));
            }
            resolved.sort_by_key(|k| k.index);
        }

        resolved
    }
}

/// Index space a schedule is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDomain {
    pub total_points: usize,
    /// `Some` for looping schedules.
    pub loop_length: Option<usize>,
}

impl ScheduleDomain {
    /// `loop_length` for looping schedules, `total_points` otherwise.
    #[must_use]
    pub fn length(&self) -> usize {
        self.loop_length.unwrap_or(self.total_points)
    }

    fn last_index(&self) -> i64 {
        self.total_points as i64 - 1
    }

    /// `round(percent / 100 * (length - 1))`, with `percent` clamped to `[0, 100]`.
    #[must_use]
    pub fn index_for_percent(&self, percent: f64) -> i64 {
        let span = self.length().saturating_sub(1) as f64;
        (percent.clamp(0.0, 100.0) / 100.0 * span).round() as i64
    }

    /// `round(offset_percent / 100 * length)`, with halves rounded towards
    /// positive infinity (`-0.5 -> 0`, `0.5 -> 1`).
    #[must_use]
    pub fn offset_points(&self, offset_percent: f64) -> i64 {
        (offset_percent / 100.0 * self.length() as f64 + 0.5).floor() as i64
    }

    /// Query index for output point `index` after shifting by `offset_points`:
    /// clamped to the curve for single-span schedules, wrapped into the loop
    /// otherwise.
    #[must_use]
    pub fn effective_index(&self, index: usize, offset_points: i64) -> i64 {
        let shifted = index as i64 - offset_points;
        match self.loop_length {
            Some(0) => 0,
            Some(loop_length) => shifted.rem_euclid(loop_length as i64),
            None => shifted.clamp(0, self.last_index().max(0)),
        }
    }
}
