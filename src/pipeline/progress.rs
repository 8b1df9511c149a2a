use crate::pipeline::geo::distance_km;
use crate::types::point::{GeoPoint, RoutePosition};
use crate::types::series::ProgressSeries;

/// Exact indices this close to an integer are treated as landing on the point,
/// so `k / (n - 1)` progress values resolve to point `k` rather than `k - 1`.
const INDEX_SNAP: f64 = 1e-9;

pub fn build_series(route: &[GeoPoint]) -> ProgressSeries {
    let mut cumulative_distance_km = Vec::with_capacity(route.len());
    let mut altitude_m = Vec::with_capacity(route.len());

    let mut total = 0.0;
    let mut prev: Option<&GeoPoint> = None;
    for point in route {
        if let Some(prev) = prev {
            total += distance_km(prev.lat_lng(), point.lat_lng());
        }
        cumulative_distance_km.push(total);
        altitude_m.push(point.altitude());
        prev = Some(point);
    }

    ProgressSeries {
        cumulative_distance_km,
        altitude_m,
    }
}

/// Interpolated position at a normalized progress along the route, or `None`
/// for an empty route. Progress outside `[0, 1]` is clamped.
pub fn position_at_progress(route: &[GeoPoint], progress: f64) -> Option<RoutePosition> {
    let last = route.len().checked_sub(1)?;
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };

    let mut exact_index = progress * last as f64;
    if (exact_index - exact_index.round()).abs() < INDEX_SNAP {
        exact_index = exact_index.round();
    }
    let index = exact_index.floor() as usize;
    let fraction = exact_index - index as f64;

    if index >= last {
        return Some(position_at_index(route, last));
    }

    let a = &route[index];
    let b = &route[index + 1];
    Some(RoutePosition {
        lat: lerp(a.lat, b.lat, fraction),
        lng: lerp(a.lng, b.lng, fraction),
        alt: lerp(a.altitude(), b.altitude(), fraction),
        index,
    })
}

fn position_at_index(route: &[GeoPoint], index: usize) -> RoutePosition {
    let point = &route[index];
    RoutePosition {
        lat: point.lat,
        lng: point.lng,
        alt: point.altitude(),
        index,
    }
}

pub(crate) fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }

    #[test]
    fn snapped_index_lands_on_point() {
        let route: Vec<GeoPoint> = (0..7).map(|i| GeoPoint::new(0.0, i as f64, 0.0)).collect();
        for k in 0..7 {
            let pos = position_at_progress(&route, k as f64 / 6.0).expect("position");
            assert_eq!(pos.index, k);
            assert_eq!(pos.lng, k as f64);
        }
    }
}
