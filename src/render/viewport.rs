//! Mapping of curve coordinates into a padded drawing area.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox2, Point2};
use crate::motion::SampledPoint;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_PADDING: f64 = 50.0;

/// A drawing area of `width × height` with a uniform inner `padding`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: DEFAULT_PADDING,
        }
    }

    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Transform that maps `bounds` onto `[padding, width - padding]` ×
    /// `[padding, height - padding]`. Each axis is stretched independently.
    #[must_use]
    pub fn transform_for(&self, bounds: BBox2) -> ViewportTransform {
        ViewportTransform {
            x: AxisMap::new(bounds.min.x, bounds.max.x, self.padding, self.width - self.padding),
            y: AxisMap::new(bounds.min.y, bounds.max.y, self.padding, self.height - self.padding),
        }
    }

    /// Rescale `points` in place to fill the viewport. Attached properties
    /// and indices are left alone.
    pub fn fit(&self, points: &mut [SampledPoint]) {
        let Some(bounds) = BBox2::from_points(points.iter().map(SampledPoint::position)) else {
            return;
        };
        let transform = self.transform_for(bounds);
        for point in points.iter_mut() {
            let mapped = transform.apply(point.position());
            point.x = mapped.x;
            point.y = mapped.y;
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Affine per-axis map produced by [`Viewport::transform_for`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    x: AxisMap,
    y: AxisMap,
}

impl ViewportTransform {
    #[must_use]
    pub fn apply(&self, point: Point2) -> Point2 {
        Point2::new(self.x.apply(point.x), self.y.apply(point.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisMap {
    source_min: f64,
    scale: Option<f64>,
    target_min: f64,
    target_max: f64,
}

impl AxisMap {
    fn new(source_min: f64, source_max: f64, target_min: f64, target_max: f64) -> Self {
        let span = source_max - source_min;
        // Zero span collapses to the middle of the target range.
        let scale = (span.is_finite() && span > 0.0).then(|| (target_max - target_min) / span);
        Self {
            source_min,
            scale,
            target_min,
            target_max,
        }
    }

    fn apply(&self, value: f64) -> f64 {
        match self.scale {
            Some(scale) => self.target_min + (value - self.source_min) * scale,
            None => (self.target_min + self.target_max) * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_maps_bounds_to_padded_area() {
        let mut points = vec![
            SampledPoint::new(-10.0, 5.0, 0),
            SampledPoint::new(10.0, 15.0, 1),
            SampledPoint::new(0.0, 10.0, 2),
        ];
        Viewport::new(300.0, 200.0).fit(&mut points);
        assert_eq!((points[0].x, points[0].y), (50.0, 50.0));
        assert_eq!((points[1].x, points[1].y), (250.0, 150.0));
        assert_eq!((points[2].x, points[2].y), (150.0, 100.0));
        assert_eq!(points[2].index, 2);
    }

    #[test]
    fn flat_axis_maps_to_center() {
        let mut points = vec![SampledPoint::new(0.0, 3.0, 0), SampledPoint::new(4.0, 3.0, 1)];
        Viewport::new(300.0, 200.0).fit(&mut points);
        assert_eq!(points[0].y, 100.0);
        assert_eq!(points[1].y, 100.0);
        assert_eq!(points[1].x, 250.0);
    }

    #[test]
    fn empty_input_is_untouched() {
        let mut points: Vec<SampledPoint> = Vec::new();
        Viewport::default().fit(&mut points);
        assert!(points.is_empty());
    }
}
