use chrono::NaiveDateTime;

use crate::error::ParseError;
use crate::pipeline::parse::{ParsedRoute, Parser};
use crate::types::point::{CaptureMetadata, GeoPoint};
use crate::types::route::FileFormat;

/// Drone flight recorders log altitude separately; samples without it are
/// assumed to fly at this height.
const DEFAULT_ALTITUDE_M: f64 = 100.0;
const TIMESTAMP_LEN: usize = 23;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Telemetry subtitles as written by DJI drones: one block per video frame,
/// with a `[latitude: ..] [longitude: ..] [abs_alt: ..]` parameter line.
pub struct SrtParser;

impl Parser for SrtParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedRoute, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidSrt(e.to_string()))?;

        let points: Vec<GeoPoint> = blocks(text).filter_map(|block| parse_block(&block)).collect();

        if points.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedRoute {
            points,
            file_format: FileFormat::Srt,
        })
    }
}

/// Groups non-blank lines into blank-line separated blocks.
fn blocks(text: &str) -> impl Iterator<Item = Vec<&str>> {
    let mut lines = text.lines().map(str::trim).peekable();
    std::iter::from_fn(move || {
        while lines.peek().is_some_and(|l| l.is_empty()) {
            lines.next();
        }
        let mut block = Vec::new();
        while let Some(line) = lines.next_if(|l| !l.is_empty()) {
            block.push(line);
        }
        (!block.is_empty()).then_some(block)
    })
}

fn parse_block(lines: &[&str]) -> Option<GeoPoint> {
    let params = lines.iter().find(|l| l.contains("[latitude:"))?;

    let lat = field(params, "latitude")?.parse::<f64>().ok()?;
    let lng = field(params, "longitude")?.parse::<f64>().ok()?;
    let alt = field(params, "abs_alt")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(DEFAULT_ALTITUDE_M);

    let metadata = CaptureMetadata {
        iso: field(params, "iso").map(str::to_string),
        shutter: field(params, "shutter").map(str::to_string),
        fnum: field(params, "fnum").map(str::to_string),
        focal_len: field(params, "focal_len").map(str::to_string),
        captured_at: lines.iter().find_map(|l| find_timestamp(l)),
    };

    Some(GeoPoint {
        lat,
        lng,
        alt: Some(alt),
        metadata: (!metadata.is_empty()).then_some(metadata),
    })
}

/// Numeric value following `key:` in a parameter line, e.g. `1/500.0` for
/// `shutter`. The key must not be the tail of a longer key.
fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{}:", key);
    let mut search_from = 0;
    while let Some(found) = line[search_from..].find(&needle) {
        let start = search_from + found;
        search_from = start + needle.len();

        let preceded_by_word = line[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if preceded_by_word {
            continue;
        }

        let rest = line[search_from..].trim_start();
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | '/')))
            .unwrap_or(rest.len());
        if end > 0 {
            return Some(&rest[..end]);
        }
    }
    None
}

fn find_timestamp(line: &str) -> Option<NaiveDateTime> {
    line.char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .find_map(|(i, _)| {
            let candidate = line.get(i..i + TIMESTAMP_LEN)?;
            NaiveDateTime::parse_from_str(candidate, TIMESTAMP_FORMAT).ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ignores_longer_keys() {
        let line = "[rel_alt: 50.000 abs_alt: 212.5]";
        assert_eq!(field(line, "abs_alt"), Some("212.5"));
        assert_eq!(field(line, "alt"), None);
    }

    #[test]
    fn field_keeps_fraction_and_sign() {
        let line = "[shutter: 1/500.0] [longitude: -122.4194]";
        assert_eq!(field(line, "shutter"), Some("1/500.0"));
        assert_eq!(field(line, "longitude"), Some("-122.4194"));
    }

    #[test]
    fn timestamp_found_mid_line() {
        let ts = find_timestamp("<font>2023-09-21 12:34:56.789</font>").expect("timestamp");
        assert_eq!(ts.to_string(), "2023-09-21 12:34:56.789");
    }

    #[test]
    fn blocks_split_on_blank_lines() {
        let text = "1\na\n\n\n2\nb\r\n\r\n3\n";
        let grouped: Vec<Vec<&str>> = blocks(text).collect();
        assert_eq!(grouped, vec![vec!["1", "a"], vec!["2", "b"], vec!["3"]]);
    }
}
