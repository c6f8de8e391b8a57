//! Keyframe schedules that vary point properties along the curve.

mod color;
mod interpolate;
mod keyframe;

pub use color::{Color, Rgb};
pub use interpolate::{
    Lerp, ScheduleEvaluator, ScheduleOutcome, apply_schedule, apply_schedules, value_at,
    value_at_lerp,
};
pub use keyframe::{
    Keyframe, KeyframeValue, Property, PropertySchedule, ResolvedKeyframe, ScheduleDomain,
    ScheduleError, ScheduleResult,
};
