use crate::pipeline::projection::MapProjection;
use crate::pipeline::segment::project_onto_segment;
use crate::types::point::{GeoPoint, HoverSelection, LatLng};
use crate::types::route::RouteShape;

pub const DEFAULT_THRESHOLD_PX: f64 = 15.0;
pub const DEFAULT_STRIDE: usize = 5;
pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverOptions {
    pub threshold_px: f64,
    pub stride: usize,
    pub window: usize,
}

impl Default for HoverOptions {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_THRESHOLD_PX,
            stride: DEFAULT_STRIDE,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Best match found by a strategy, before the acceptance threshold applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub point: GeoPoint,
    pub index: Option<usize>,
    pub distance_px: f64,
}

/// Finds the route location nearest a cursor in screen space.
pub trait NearestPointStrategy {
    fn nearest(
        &self,
        route: &[GeoPoint],
        cursor: LatLng,
        projection: &dyn MapProjection,
    ) -> Option<Candidate>;
}

/// Coarse-to-fine scan over a discrete point list: every `stride`-th point
/// first, then every point within `window` of the coarse winner.
///
/// A closer point outside the refinement window can be missed; this trades
/// exactness for `n / stride + 2 * window + 1` distance evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StridedScan {
    pub stride: usize,
    pub window: usize,
}

impl Default for StridedScan {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            window: DEFAULT_WINDOW,
        }
    }
}

impl NearestPointStrategy for StridedScan {
    fn nearest(
        &self,
        route: &[GeoPoint],
        cursor: LatLng,
        projection: &dyn MapProjection,
    ) -> Option<Candidate> {
        if route.is_empty() {
            return None;
        }
        let cursor_px = projection.to_pixel(cursor);
        let distance_at = |i: usize| cursor_px.distance(projection.to_pixel(route[i].lat_lng()));

        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for i in (0..route.len()).step_by(self.stride.max(1)) {
            let d = distance_at(i);
            if d < best_distance {
                best_distance = d;
                best_index = i;
            }
        }

        let start = best_index.saturating_sub(self.window);
        let end = (best_index + self.window).min(route.len() - 1);
        for i in start..=end {
            let d = distance_at(i);
            if d < best_distance {
                best_distance = d;
                best_index = i;
            }
        }

        Some(Candidate {
            point: route[best_index].clone(),
            index: Some(best_index),
            distance_px: best_distance,
        })
    }
}

/// Full scan over a polyline: every vertex, plus the true nearest point on
/// every segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentScan;

impl NearestPointStrategy for SegmentScan {
    fn nearest(
        &self,
        route: &[GeoPoint],
        cursor: LatLng,
        projection: &dyn MapProjection,
    ) -> Option<Candidate> {
        let cursor_px = projection.to_pixel(cursor);
        let mut best: Option<Candidate> = None;
        let consider = |point: GeoPoint, best: &mut Option<Candidate>| {
            let d = cursor_px.distance(projection.to_pixel(point.lat_lng()));
            if best.as_ref().map_or(true, |b| d < b.distance_px) {
                *best = Some(Candidate {
                    point,
                    index: None,
                    distance_px: d,
                });
            }
        };

        for point in route {
            consider(point.clone(), &mut best);
        }
        for pair in route.windows(2) {
            let projected = project_onto_segment(projection, cursor, &pair[0], &pair[1]);
            consider(projected.point, &mut best);
        }

        best
    }
}

/// Hover search over the active route. Returns a selection only when the best
/// candidate lies strictly closer than the threshold.
pub fn find_hover(
    route: &[GeoPoint],
    shape: RouteShape,
    cursor: LatLng,
    projection: &dyn MapProjection,
    options: &HoverOptions,
) -> Option<HoverSelection> {
    let candidate = match shape {
        RouteShape::Discrete => StridedScan {
            stride: options.stride,
            window: options.window,
        }
        .nearest(route, cursor, projection),
        RouteShape::Continuous => SegmentScan.nearest(route, cursor, projection),
    }?;

    if candidate.distance_px < options.threshold_px {
        tracing::debug!(
            "Hover selected {:?} at {:.2} px",
            candidate.index,
            candidate.distance_px
        );
        Some(HoverSelection {
            point: candidate.point,
            index: candidate.index,
            screen_distance_px: candidate.distance_px,
        })
    } else {
        None
    }
}
