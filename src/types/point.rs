use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A bare geographic coordinate, e.g. a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Camera parameters recorded alongside an imported telemetry sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fnum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_len: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<NaiveDateTime>,
}

impl CaptureMetadata {
    pub fn is_empty(&self) -> bool {
        self.iso.is_none()
            && self.shutter.is_none()
            && self.fnum.is_none()
            && self.focal_len.is_none()
            && self.captured_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CaptureMetadata>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64, alt: f64) -> Self {
        Self {
            lat,
            lng,
            alt: Some(alt),
            metadata: None,
        }
    }

    /// Altitude in metres; a missing altitude reads as ground level.
    pub fn altitude(&self) -> f64 {
        self.alt.unwrap_or(0.0)
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// An interpolated location along a route, tagged with the index of the
/// route point it starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePosition {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
    pub index: usize,
}

impl RoutePosition {
    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// The route location currently nearest the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverSelection {
    pub point: GeoPoint,
    /// Route index, reported only for discrete (point list) routes.
    pub index: Option<usize>,
    pub screen_distance_px: f64,
}
