use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;

use crate::document::{ChartDocument, document_error};
use crate::error::{OverlayError, OverlayResult};
use crate::render::{MarkerState, OverlaySurface, format_number};

/// Attribute identifying the live marker inside the chart.
pub const LIVE_MARKER_ATTRIBUTE: &str = "data-live-dot";

impl OverlaySurface for ChartDocument {
    fn apply(&mut self, state: &MarkerState) -> OverlayResult<()> {
        state.validate()?;
        if self.placeholder {
            return Err(OverlayError::Document(
                "cannot place a marker on a placeholder chart".to_owned(),
            ));
        }
        trace!(x = state.point.x, y = state.point.y, "upsert live marker");
        self.marker = Some(state.clone());
        Ok(())
    }
}

/// Markup for the live marker: the circle with exactly one `title` and at
/// most one `animate` child.
pub(super) fn marker_markup(state: &MarkerState, prefix: Option<&str>) -> OverlayResult<String> {
    let name = |local: &str| match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_owned(),
    };
    let circle_name = name("circle");
    let title_name = name("title");

    let mut circle = BytesStart::new(circle_name.as_str());
    circle.push_attribute((LIVE_MARKER_ATTRIBUTE, "true"));
    circle.push_attribute(("r", format_number(state.radius_px).as_str()));
    circle.push_attribute(("stroke", state.stroke.to_svg().as_str()));
    circle.push_attribute((
        "stroke-width",
        format_number(state.stroke_width_px).as_str(),
    ));
    circle.push_attribute(("fill", state.fill.to_svg().as_str()));
    circle.push_attribute(("cx", format_number(state.point.x).as_str()));
    circle.push_attribute(("cy", format_number(state.point.y).as_str()));

    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(circle))?;
    write(&mut writer, Event::Start(BytesStart::new(title_name.as_str())))?;
    write(&mut writer, Event::Text(BytesText::new(&state.tooltip)))?;
    write(&mut writer, Event::End(BytesEnd::new(title_name.as_str())))?;

    if let Some(pulse) = state.pulse {
        let keyframes = pulse.keyframes();
        let duration = pulse.duration();
        let animate_name = name("animate");
        let mut animate = BytesStart::new(animate_name.as_str());
        animate.push_attribute(("attributeName", "r"));
        animate.push_attribute(("values", keyframes.as_str()));
        animate.push_attribute(("dur", duration.as_str()));
        animate.push_attribute(("repeatCount", "indefinite"));
        animate.push_attribute(("fill", "freeze"));
        write(&mut writer, Event::Empty(animate))?;
    }

    write(&mut writer, Event::End(BytesEnd::new(circle_name.as_str())))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| document_error(format!("marker markup is not utf-8: {e}")))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> OverlayResult<()> {
    writer
        .write_event(event)
        .map_err(|e| document_error(format!("failed to write marker: {e}")))
}
