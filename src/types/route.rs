use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::point::GeoPoint;

/// An ordered, immutable sequence of route points. Cloning shares the
/// underlying buffer; changing a route means building a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Arc<[GeoPoint]>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deref for Route {
    type Target = [GeoPoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl From<Vec<GeoPoint>> for Route {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.points().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<GeoPoint>::deserialize(deserializer).map(Route::new)
    }
}

/// How a route is represented on the map, which decides how hover search
/// treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteShape {
    /// A dense imported point list; searched by strided sampling.
    #[default]
    Discrete,
    /// A short polyline; every vertex and segment is searched.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Gpx,
    Srt,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "gpx" => Some(FileFormat::Gpx),
            "srt" => Some(FileFormat::Srt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Srt => "srt",
        }
    }
}
