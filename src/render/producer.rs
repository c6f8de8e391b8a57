//! Renderer-agnostic geometry built from sampled points.
//!
//! Line mode turns every consecutive point pair into a Bézier (or straight)
//! segment styled by the pair's first point. Object mode turns every point
//! into a primitive centred on it. Nothing here knows about SVG or canvases.

use serde::{Deserialize, Serialize};

use crate::geom::{
    ControlPointOptions, CurveSegment, Point2, SmoothSpan, smooth_segments, span_path_data,
};
use crate::motion::SampledPoint;
use crate::schedule::{Color, Property};

/// Stroke width used when a point has no line width.
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
/// Object width used when a point has no object width.
pub const DEFAULT_OBJECT_WIDTH: f64 = 3.0;
/// Opacity used when a point has no opacity.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// How a curve is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Continuous smoothed curve.
    #[default]
    Line,
    /// One primitive per point.
    Object,
}

impl RenderMode {
    const LINE_PROPERTIES: [Property; 3] = [Property::Color, Property::LineWidth, Property::Opacity];
    const OBJECT_PROPERTIES: [Property; 4] = [
        Property::Color,
        Property::ObjectWidth,
        Property::Height,
        Property::Opacity,
    ];

    /// Properties whose schedules matter in this mode.
    #[must_use]
    pub const fn properties(self) -> &'static [Property] {
        match self {
            Self::Line => &Self::LINE_PROPERTIES,
            Self::Object => &Self::OBJECT_PROPERTIES,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Object => "object",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "line" => Some(Self::Line),
            "object" => Some(Self::Object),
            _ => None,
        }
    }
}

/// Stroke attributes carried by a line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
}

impl StrokeStyle {
    /// Style of `point`, falling back to the defaults for unset properties.
    #[must_use]
    pub fn of(point: &SampledPoint) -> Self {
        Self {
            color: point.color.clone().unwrap_or_default(),
            width: point.line_width.unwrap_or(DEFAULT_LINE_WIDTH),
            opacity: point.opacity.unwrap_or(DEFAULT_OPACITY),
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: DEFAULT_LINE_WIDTH,
            opacity: DEFAULT_OPACITY,
        }
    }
}

/// Shape of a line segment between two consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentShape {
    Cubic { control1: Point2, control2: Point2 },
    Line,
}

/// One styled span of a line-mode curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub start: Point2,
    pub end: Point2,
    pub shape: SegmentShape,
    pub style: StrokeStyle,
}

impl PathSegment {
    #[must_use]
    pub const fn span(&self) -> SmoothSpan {
        match self.shape {
            SegmentShape::Cubic { control1, control2 } => {
                SmoothSpan::Curve(CurveSegment::new(self.start, control1, control2, self.end))
            }
            SegmentShape::Line => SmoothSpan::Line {
                start: self.start,
                end: self.end,
            },
        }
    }

    /// SVG path data (`M … C …` or `M … L …`) for this segment alone.
    #[must_use]
    pub fn path_data(&self) -> String {
        span_path_data(&self.span())
    }
}

/// One object-mode primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPrimitive {
    pub center: Point2,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    pub opacity: f64,
}

impl ObjectPrimitive {
    #[must_use]
    pub fn of(point: &SampledPoint) -> Self {
        let width = point.object_width.unwrap_or(DEFAULT_OBJECT_WIDTH);
        Self {
            center: point.position(),
            width,
            height: point.height.unwrap_or(width),
            color: point.color.clone().unwrap_or_default(),
            opacity: point.opacity.unwrap_or(DEFAULT_OPACITY),
        }
    }

    /// Whether the primitive is drawn as a circle rather than an ellipse.
    #[must_use]
    pub fn is_circle(&self) -> bool {
        self.width == self.height
    }
}

/// Output of [`produce_geometry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Geometry {
    Line { segments: Vec<PathSegment> },
    Object { objects: Vec<ObjectPrimitive> },
}

impl Geometry {
    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        match self {
            Self::Line { .. } => RenderMode::Line,
            Self::Object { .. } => RenderMode::Object,
        }
    }

    /// Number of segments or objects.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line { segments } => segments.len(),
            Self::Object { objects } => objects.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Combine points and their attached properties into drawable geometry.
///
/// In line mode each segment takes the style of its starting point; styles
/// are not interpolated within a segment. Fewer than two points produce no
/// segments.
#[must_use]
pub fn produce_geometry(
    points: &[SampledPoint],
    mode: RenderMode,
    options: ControlPointOptions,
) -> Geometry {
    match mode {
        RenderMode::Line => Geometry::Line {
            segments: line_segments(points, options),
        },
        RenderMode::Object => Geometry::Object {
            objects: points.iter().map(ObjectPrimitive::of).collect(),
        },
    }
}

fn line_segments(points: &[SampledPoint], options: ControlPointOptions) -> Vec<PathSegment> {
    let positions: Vec<Point2> = points.iter().map(SampledPoint::position).collect();

    smooth_segments(&positions, options)
        .into_iter()
        .zip(points)
        .map(|(span, point)| {
            let shape = match span {
                SmoothSpan::Curve(segment) => SegmentShape::Cubic {
                    control1: segment.control1,
                    control2: segment.control2,
                },
                SmoothSpan::Line { .. } => SegmentShape::Line,
            };
            PathSegment {
                start: span.start(),
                end: span.end(),
                shape,
                style: StrokeStyle::of(point),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<SampledPoint> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| SampledPoint::new(x, y, i))
            .collect()
    }

    #[test]
    fn line_mode_styles_segments_by_start_point() {
        let mut pts = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]);
        pts[1].color = Some(Color::rgb(255, 0, 0));
        pts[1].line_width = Some(4.0);
        pts[2].opacity = Some(0.5);

        let Geometry::Line { segments } =
            produce_geometry(&pts, RenderMode::Line, ControlPointOptions::default())
        else {
            panic!("expected line geometry");
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].style, StrokeStyle::default());
        assert_eq!(segments[1].style.color, Color::rgb(255, 0, 0));
        assert_eq!(segments[1].style.width, 4.0);
        assert_eq!(segments[2].style.opacity, 0.5);
        assert!(segments.iter().all(|s| matches!(s.shape, SegmentShape::Cubic { .. })));
        assert_eq!(segments[2].end, Point2::new(3.0, 1.0));
    }

    #[test]
    fn line_mode_falls_back_to_straight_spans() {
        let pts = points(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let geometry = produce_geometry(&pts, RenderMode::Line, ControlPointOptions::default());
        let Geometry::Line { segments } = geometry else {
            panic!("expected line geometry");
        };
        assert!(segments.iter().all(|s| s.shape == SegmentShape::Line));
    }

    #[test]
    fn single_point_gives_no_segments() {
        let geometry =
            produce_geometry(&points(&[(0.0, 0.0)]), RenderMode::Line, ControlPointOptions::default());
        assert!(geometry.is_empty());
    }

    #[test]
    fn object_mode_uses_defaults() {
        let mut pts = points(&[(5.0, 6.0), (7.0, 8.0)]);
        pts[1].object_width = Some(10.0);
        pts[1].height = Some(4.0);

        let Geometry::Object { objects } =
            produce_geometry(&pts, RenderMode::Object, ControlPointOptions::default())
        else {
            panic!("expected object geometry");
        };
        assert_eq!(objects[0].center, Point2::new(5.0, 6.0));
        assert_eq!(objects[0].width, DEFAULT_OBJECT_WIDTH);
        assert_eq!(objects[0].height, DEFAULT_OBJECT_WIDTH);
        assert!(objects[0].is_circle());
        assert_eq!(objects[1].width, 10.0);
        assert!(!objects[1].is_circle());
    }

    #[test]
    fn render_mode_properties() {
        assert_eq!(RenderMode::from_name(" Object "), Some(RenderMode::Object));
        assert_eq!(RenderMode::from_name("dots"), None);
        assert!(!RenderMode::Line.properties().contains(&Property::Height));
        assert!(RenderMode::Object.properties().contains(&Property::ObjectWidth));
    }
}
