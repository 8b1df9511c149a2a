use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::pipeline::parse::{ParsedRoute, Parser};
use crate::types::point::{CaptureMetadata, GeoPoint};
use crate::types::route::FileFormat;

pub struct GpxParser;

/// Point elements in order of preference. A file's route comes from the
/// first kind it contains; the others are ignored.
const POINT_ELEMENTS: [&str; 3] = ["trkpt", "rtept", "wpt"];

fn point_kind(name: &str) -> Option<usize> {
    POINT_ELEMENTS.iter().position(|el| *el == name)
}

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedRoute, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut by_kind: [Vec<GeoPoint>; 3] = Default::default();
        let mut current_point: Option<(usize, GeoPoint)> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = element_name(&e)?;
                    if let Some(kind) = point_kind(&name) {
                        current_point = point_from_attributes(&e)?.map(|p| (kind, p));
                    } else if current_point.is_some() {
                        current_element = name;
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = element_name(&e)?;
                    if let Some(kind) = point_kind(&name) {
                        if let Some(point) = point_from_attributes(&e)? {
                            by_kind[kind].push(point);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, point)) = current_point.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                        match current_element.as_str() {
                            "ele" => point.alt = text.parse().ok(),
                            "time" => {
                                if let Ok(time) = text.parse::<DateTime<Utc>>() {
                                    point.metadata = Some(CaptureMetadata {
                                        captured_at: Some(time.naive_utc()),
                                        ..CaptureMetadata::default()
                                    });
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if point_kind(name_str).is_some() {
                        if let Some((kind, point)) = current_point.take() {
                            by_kind[kind].push(point);
                        }
                    }
                    current_element.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        let points = by_kind
            .into_iter()
            .find(|points| !points.is_empty())
            .ok_or(ParseError::EmptyFile)?;

        Ok(ParsedRoute {
            points,
            file_format: FileFormat::Gpx,
        })
    }
}

fn element_name(e: &BytesStart) -> Result<String, ParseError> {
    let name = e.name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidGpx(e.to_string()))
}

fn point_from_attributes(e: &BytesStart) -> Result<Option<GeoPoint>, ParseError> {
    let mut lat = None;
    let mut lng = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match key {
            "lat" => lat = value.parse::<f64>().ok(),
            "lon" => lng = value.parse::<f64>().ok(),
            _ => {}
        }
    }

    Ok(match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint {
            lat,
            lng,
            alt: None,
            metadata: None,
        }),
        _ => None,
    })
}
