//! Loaded chart document: an opaque SVG drawing plus the calibration read
//! from its root element.

mod overlay;

pub use overlay::LIVE_MARKER_ATTRIBUTE;

use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, warn};

use crate::core::{Axis, ChartCalibration};
use crate::error::{OverlayError, OverlayResult};
use crate::render::MarkerState;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Chart drawing owned by the display surface for its loaded lifetime.
///
/// `source` never contains the live marker; the marker is re-emitted on
/// serialization so repeated updates cannot accumulate elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDocument {
    source: String,
    root_name: String,
    root_attributes: Vec<(String, String)>,
    calibration: Option<ChartCalibration>,
    marker: Option<MarkerState>,
    placeholder: bool,
}

impl ChartDocument {
    /// Parses an SVG chart and recomputes its calibration.
    ///
    /// Any live marker already present (e.g. in a previously saved overlay)
    /// is dropped from the drawing.
    pub fn from_svg_str(svg: &str) -> OverlayResult<Self> {
        let mut reader = Reader::from_str(svg);
        let mut writer = Writer::new(Vec::with_capacity(svg.len()));
        let mut root: Option<(String, Vec<(String, String)>)> = None;
        let mut depth = 0usize;
        let mut skip_depth = 0usize;
        let mut root_closed = false;
        let mut stripped = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| document_error(format!("malformed svg at byte {}: {e}", reader.buffer_position())))?;

            if skip_depth > 0 {
                match event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    Event::Eof => return Err(document_error("unterminated live marker element")),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(start) => {
                    if root.is_none() {
                        root = Some(read_root(&start)?);
                    } else if is_live_marker(&start)? {
                        skip_depth = 1;
                        stripped += 1;
                        continue;
                    }
                    depth += 1;
                    write_event(&mut writer, Event::Start(start))?;
                }
                Event::Empty(start) => {
                    if root.is_none() {
                        root = Some(read_root(&start)?);
                        let end = start.to_end().into_owned();
                        write_event(&mut writer, Event::Start(start))?;
                        write_event(&mut writer, Event::End(end))?;
                        root_closed = true;
                    } else if is_live_marker(&start)? {
                        stripped += 1;
                    } else {
                        write_event(&mut writer, Event::Empty(start))?;
                    }
                }
                Event::End(end) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        root_closed = true;
                    }
                    write_event(&mut writer, Event::End(end))?;
                }
                Event::Eof => break,
                other => write_event(&mut writer, other)?,
            }
        }

        let Some((root_name, root_attributes)) = root else {
            return Err(document_error("document has no root element"));
        };
        if !root_closed {
            return Err(document_error("root element is not closed"));
        }

        let source = String::from_utf8(writer.into_inner())
            .map_err(|e| document_error(format!("svg is not valid utf-8: {e}")))?;
        let calibration = ChartCalibration::from_descriptors(
            attribute(&root_attributes, Axis::X.descriptor_attribute()),
            attribute(&root_attributes, Axis::Y.descriptor_attribute()),
        );
        debug!(
            calibrated = calibration.is_some(),
            stripped_markers = stripped,
            "chart document parsed"
        );

        Ok(Self {
            source,
            root_name,
            root_attributes,
            calibration,
            marker: None,
            placeholder: false,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let path = path.as_ref();
        let svg = tokio::fs::read_to_string(path).await?;
        let document = Self::from_svg_str(&svg)?;
        info!(path = %path.display(), "chart loaded");
        Ok(document)
    }

    /// Downloads and parses a chart; a non-success status is an error.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> OverlayResult<Self> {
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| document_error(format!("failed to fetch chart from {url}: {e}")))?;
        let svg = response
            .text()
            .await
            .map_err(|e| document_error(format!("failed to read chart body from {url}: {e}")))?;
        let document = Self::from_svg_str(&svg)?;
        info!(%url, "chart loaded");
        Ok(document)
    }

    /// Loads from a URL (`http://`/`https://`) or a file path, falling back to
    /// a textual placeholder when the chart cannot be loaded.
    pub async fn load_or_placeholder(client: &reqwest::Client, location: &str) -> Self {
        let loaded = if location.starts_with("http://") || location.starts_with("https://") {
            Self::fetch(client, location).await
        } else {
            Self::load(location).await
        };
        match loaded {
            Ok(document) => document,
            Err(err) => {
                warn!(%location, error = %err, "chart load failed, showing placeholder");
                Self::placeholder(format!("Failed to load SVG from {location}."))
            }
        }
    }

    /// Minimal chart showing `message` in place of the drawing. It carries no
    /// calibration, so no marker can be mapped onto it.
    #[must_use]
    pub fn placeholder(message: impl AsRef<str>) -> Self {
        let source = format!(
            r##"<svg xmlns="{SVG_NAMESPACE}" width="640" height="120" viewBox="0 0 640 120"><text x="320" y="60" text-anchor="middle" fill="#888888">{}</text></svg>"##,
            escape(message.as_ref())
        );

        Self {
            source,
            root_name: "svg".to_owned(),
            root_attributes: vec![("xmlns".to_owned(), SVG_NAMESPACE.to_owned())],
            calibration: None,
            marker: None,
            placeholder: true,
        }
    }

    #[must_use]
    pub fn calibration(&self) -> Option<&ChartCalibration> {
        self.calibration.as_ref()
    }

    #[must_use]
    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        attribute(&self.root_attributes, name)
    }

    #[must_use]
    pub fn marker(&self) -> Option<&MarkerState> {
        self.marker.as_ref()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Serializes the drawing with the current live marker, if any.
    pub fn to_svg_string(&self) -> OverlayResult<String> {
        let Some(marker) = &self.marker else {
            return Ok(self.source.clone());
        };
        let root_end = format!("</{}", self.root_name);
        let insert_at = self
            .source
            .rfind(&root_end)
            .ok_or_else(|| document_error("root end tag missing from chart source"))?;
        let markup = overlay::marker_markup(marker, self.element_prefix())?;

        let mut svg = String::with_capacity(self.source.len() + markup.len());
        svg.push_str(&self.source[..insert_at]);
        svg.push_str(&markup);
        svg.push_str(&self.source[insert_at..]);
        Ok(svg)
    }

    /// Writes the serialized chart through a temp file in the target
    /// directory, then renames it into place.
    pub fn save(&self, path: impl AsRef<Path>) -> OverlayResult<()> {
        let svg = self.to_svg_string()?;
        crate::persist::write_atomic(path.as_ref(), svg.as_bytes())
    }

    fn element_prefix(&self) -> Option<&str> {
        self.root_name.split_once(':').map(|(prefix, _)| prefix)
    }
}

fn read_root(start: &BytesStart<'_>) -> OverlayResult<(String, Vec<(String, String)>)> {
    if start.local_name().as_ref() != b"svg" {
        return Err(document_error(format!(
            "root element is `{}`, expected `svg`",
            String::from_utf8_lossy(start.name().as_ref())
        )));
    }
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| document_error(format!("invalid root attribute: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| document_error(format!("invalid root attribute value: {e}")))?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok((name, attributes))
}

fn is_live_marker(start: &BytesStart<'_>) -> OverlayResult<bool> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| document_error(format!("invalid attribute: {e}")))?;
        if attr.key.as_ref() == LIVE_MARKER_ATTRIBUTE.as_bytes() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> OverlayResult<()> {
    writer
        .write_event(event)
        .map_err(|e| document_error(format!("failed to write svg event: {e}")))
}

fn document_error(message: impl Into<String>) -> OverlayError {
    OverlayError::Document(message.into())
}
