mod gpx;
mod srt;

use crate::error::ParseError;
use crate::types::point::GeoPoint;
use crate::types::route::FileFormat;

#[derive(Debug, Clone)]
pub struct ParsedRoute {
    pub points: Vec<GeoPoint>,
    pub file_format: FileFormat,
}

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedRoute, ParseError>;
}

pub fn parse(bytes: &[u8], format: FileFormat) -> Result<ParsedRoute, ParseError> {
    match format {
        FileFormat::Gpx => gpx::GpxParser.parse(bytes),
        FileFormat::Srt => srt::SrtParser.parse(bytes),
    }
}
