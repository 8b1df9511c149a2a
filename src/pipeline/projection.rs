use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::types::point::LatLng;

const TILE_SIZE_PX: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// A point in on-screen pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Pixel) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Converts between geographic and screen coordinates for one fixed viewport.
///
/// Implementations must stay consistent for the duration of a single search;
/// a changed viewport means a new projection value.
pub trait MapProjection {
    fn to_pixel(&self, point: LatLng) -> Pixel;
    fn to_geo(&self, pixel: Pixel) -> LatLng;

    fn pixel_distance(&self, a: LatLng, b: LatLng) -> f64 {
        self.to_pixel(a).distance(self.to_pixel(b))
    }
}

/// Spherical Web Mercator with 256 px tiles. Pixel coordinates are relative to
/// the top-left corner of a `width_px` x `height_px` viewport centred on `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebMercatorViewport {
    pub center: LatLng,
    pub zoom: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl WebMercatorViewport {
    pub fn new(center: LatLng, zoom: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            zoom,
            width_px,
            height_px,
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE_PX * self.zoom.exp2()
    }

    fn to_global(&self, point: LatLng) -> Pixel {
        let size = self.world_size();
        let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = (point.lng + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        Pixel::new(x, y)
    }

    fn origin(&self) -> Pixel {
        let center = self.to_global(self.center);
        Pixel::new(center.x - self.width_px / 2.0, center.y - self.height_px / 2.0)
    }
}

impl MapProjection for WebMercatorViewport {
    fn to_pixel(&self, point: LatLng) -> Pixel {
        let global = self.to_global(point);
        let origin = self.origin();
        Pixel::new(global.x - origin.x, global.y - origin.y)
    }

    fn to_geo(&self, pixel: Pixel) -> LatLng {
        let size = self.world_size();
        let origin = self.origin();
        let gx = pixel.x + origin.x;
        let gy = pixel.y + origin.y;
        let lng = gx / size * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * gy / size)).sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }
}
