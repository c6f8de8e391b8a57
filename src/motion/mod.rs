//! Oscillator engine: superposition of damped sinusoids into a sampled curve.

mod oscillator;

pub use oscillator::{
    GenerateError, GenerateResult, MAX_POINTS, MIN_POINTS, Oscillator, PointCount, SampledPoint,
    generate_points,
};
