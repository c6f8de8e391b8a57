//! Geometry producer plus the viewport fit and SVG export around it.

mod producer;
mod svg;
mod viewport;

pub use producer::{
    DEFAULT_LINE_WIDTH, DEFAULT_OBJECT_WIDTH, DEFAULT_OPACITY, Geometry, ObjectPrimitive,
    PathSegment, RenderMode, SegmentShape, StrokeStyle, produce_geometry,
};
pub use svg::{SvgError, SvgResult, render_svg, write_svg};
pub use viewport::{DEFAULT_HEIGHT, DEFAULT_PADDING, DEFAULT_WIDTH, Viewport, ViewportTransform};
