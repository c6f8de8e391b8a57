//! SVG export of produced geometry.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use thiserror::Error;

use super::producer::{Geometry, ObjectPrimitive, PathSegment};
use super::viewport::Viewport;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const BACKGROUND: &str = "#ffffff";

/// Result type for SVG export.
pub type SvgResult<T> = Result<T, SvgError>;

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("failed to write SVG: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("SVG output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write `geometry` as a standalone SVG document sized to `viewport`.
///
/// Line geometry becomes one `<path>` per segment, object geometry one
/// `<circle>` (or `<ellipse>` when width and height differ) per object.
pub fn write_svg<W: Write>(inner: W, geometry: &Geometry, viewport: &Viewport) -> SvgResult<W> {
    let mut writer = Writer::new_with_indent(inner, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = viewport.width.to_string();
    let height = viewport.height.to_string();
    let view_box = format!("0 0 {width} {height}");

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NAMESPACE));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(root))?;

    let mut background = BytesStart::new("rect");
    background.push_attribute(("width", "100%"));
    background.push_attribute(("height", "100%"));
    background.push_attribute(("fill", BACKGROUND));
    writer.write_event(Event::Empty(background))?;

    match geometry {
        Geometry::Line { segments } => {
            for segment in segments {
                writer.write_event(Event::Empty(path_element(segment)))?;
            }
        }
        Geometry::Object { objects } => {
            for object in objects {
                writer.write_event(Event::Empty(object_element(object)))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;
    log::debug!("wrote SVG with {} elements", geometry.len());
    Ok(writer.into_inner())
}

/// [`write_svg`] into a string.
pub fn render_svg(geometry: &Geometry, viewport: &Viewport) -> SvgResult<String> {
    let bytes = write_svg(Vec::new(), geometry, viewport)?;
    Ok(String::from_utf8(bytes)?)
}

fn path_element(segment: &PathSegment) -> BytesStart<'static> {
    let style = &segment.style;
    let mut element = BytesStart::new("path");
    element.push_attribute(("d", segment.path_data().as_str()));
    element.push_attribute(("fill", "none"));
    element.push_attribute(("stroke", style.color.to_hex().as_str()));
    element.push_attribute(("stroke-width", style.width.to_string().as_str()));
    element.push_attribute(("opacity", style.opacity.to_string().as_str()));
    element.push_attribute(("stroke-linecap", "butt"));
    element
}

fn object_element(object: &ObjectPrimitive) -> BytesStart<'static> {
    let mut element = if object.is_circle() {
        let mut circle = BytesStart::new("circle");
        circle.push_attribute(("r", (object.width / 2.0).to_string().as_str()));
        circle
    } else {
        let mut ellipse = BytesStart::new("ellipse");
        ellipse.push_attribute(("rx", (object.width / 2.0).to_string().as_str()));
        ellipse.push_attribute(("ry", (object.height / 2.0).to_string().as_str()));
        ellipse
    };
    element.push_attribute(("cx", object.center.x.to_string().as_str()));
    element.push_attribute(("cy", object.center.y.to_string().as_str()));
    element.push_attribute(("fill", object.color.to_hex().as_str()));
    element.push_attribute(("opacity", object.opacity.to_string().as_str()));
    element.push_attribute(("stroke", "none"));
    element
}
