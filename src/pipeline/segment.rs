use crate::pipeline::progress::lerp;
use crate::pipeline::projection::{MapProjection, Pixel};
use crate::types::point::{GeoPoint, LatLng};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProjection {
    pub point: GeoPoint,
    /// Clamped position along the segment, 0 at `start` and 1 at `end`.
    pub t: f64,
}

/// Nearest point to `point` on the segment `start -> end`, measured in pixel
/// space. A zero-length segment projects onto its start. Altitude is
/// interpolated along the segment.
pub fn project_onto_segment(
    projection: &dyn MapProjection,
    point: LatLng,
    start: &GeoPoint,
    end: &GeoPoint,
) -> SegmentProjection {
    let p = projection.to_pixel(point);
    let a = projection.to_pixel(start.lat_lng());
    let b = projection.to_pixel(end.lat_lng());

    let t = segment_parameter(p, a, b);
    if t == 0.0 {
        return SegmentProjection {
            point: endpoint(start),
            t,
        };
    }
    if t == 1.0 {
        return SegmentProjection {
            point: endpoint(end),
            t,
        };
    }

    let closest = Pixel::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    let geo = projection.to_geo(closest);
    SegmentProjection {
        point: GeoPoint {
            lat: geo.lat,
            lng: geo.lng,
            alt: Some(lerp(start.altitude(), end.altitude(), t)),
            metadata: None,
        },
        t,
    }
}

fn segment_parameter(p: Pixel, a: Pixel, b: Pixel) -> f64 {
    let (vx, vy) = (b.x - a.x, b.y - a.y);
    let length_sq = vx * vx + vy * vy;
    if length_sq == 0.0 {
        return 0.0;
    }
    let t = ((p.x - a.x) * vx + (p.y - a.y) * vy) / length_sq;
    t.clamp(0.0, 1.0)
}

fn endpoint(point: &GeoPoint) -> GeoPoint {
    GeoPoint {
        lat: point.lat,
        lng: point.lng,
        alt: Some(point.altitude()),
        metadata: None,
    }
}
