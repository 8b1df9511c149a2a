use serde::{Deserialize, Serialize};

use crate::error::{PlanError, RouteError};
use crate::pipeline::playback::{
    FrameId, FrameOutcome, FrameSource, PlaybackObserver, PlaybackScheduler, ProgressMapping,
};
use crate::pipeline::progress::{build_series, position_at_progress};
use crate::pipeline::projection::MapProjection;
use crate::pipeline::proximity::{find_hover, HoverOptions};
use crate::types::point::{GeoPoint, HoverSelection, LatLng, RoutePosition};
use crate::types::route::{Route, RouteShape};
use crate::types::series::ProgressSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    Start,
    End,
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u64,
    pub kind: WaypointKind,
    pub point: GeoPoint,
}

/// Which route representation is currently shown and searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveSource {
    Imported,
    Computed,
    Waypoints,
}

/// Owns every piece of route state: operator waypoints, an imported track, a
/// computed route, the derived chart series and the playback scheduler.
///
/// Any mutation stops playback and rebuilds the series.
pub struct RoutePlanner<F: FrameSource> {
    waypoints: Vec<Waypoint>,
    next_id: u64,
    imported: Option<Route>,
    computed: Option<Route>,
    active: Route,
    source: ActiveSource,
    series: ProgressSeries,
    playback: PlaybackScheduler<F>,
}

impl<F: FrameSource> RoutePlanner<F> {
    pub fn new(frames: F, mapping: ProgressMapping) -> Self {
        Self {
            waypoints: Vec::new(),
            next_id: 1,
            imported: None,
            computed: None,
            active: Route::default(),
            source: ActiveSource::Waypoints,
            series: ProgressSeries::default(),
            playback: PlaybackScheduler::new(frames, mapping),
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Adds a waypoint. A new start or end replaces the previous one.
    pub fn add_waypoint(&mut self, kind: WaypointKind, point: GeoPoint) -> u64 {
        if kind != WaypointKind::Intermediate {
            self.waypoints.retain(|w| w.kind != kind);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.waypoints.push(Waypoint { id, kind, point });
        self.computed = None;
        self.invalidate();
        id
    }

    pub fn move_waypoint(&mut self, id: u64, to: LatLng) -> Result<(), PlanError> {
        let waypoint = self
            .waypoints
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(PlanError::UnknownWaypoint(id))?;
        waypoint.point.lat = to.lat;
        waypoint.point.lng = to.lng;
        self.computed = None;
        self.invalidate();
        Ok(())
    }

    pub fn remove_waypoint(&mut self, id: u64) -> Result<Waypoint, PlanError> {
        let pos = self
            .waypoints
            .iter()
            .position(|w| w.id == id)
            .ok_or(PlanError::UnknownWaypoint(id))?;
        let removed = self.waypoints.remove(pos);
        self.computed = None;
        self.invalidate();
        Ok(removed)
    }

    /// Waypoints in travel order: start, intermediates as placed, end.
    pub fn waypoint_route(&self) -> Route {
        let mut ordered = Vec::with_capacity(self.waypoints.len());
        for kind in [WaypointKind::Start, WaypointKind::Intermediate, WaypointKind::End] {
            ordered.extend(
                self.waypoints
                    .iter()
                    .filter(|w| w.kind == kind)
                    .map(|w| w.point.clone()),
            );
        }
        Route::new(ordered)
    }

    /// The ordered waypoints to send for route computation, once the plan is
    /// complete enough to compute.
    pub fn calculation_request(&self) -> Result<Route, PlanError> {
        if self.waypoints.len() < 2 {
            return Err(PlanError::TooFewWaypoints(self.waypoints.len()));
        }
        if !self.waypoints.iter().any(|w| w.kind == WaypointKind::Start) {
            return Err(PlanError::MissingStart);
        }
        if !self.waypoints.iter().any(|w| w.kind == WaypointKind::End) {
            return Err(PlanError::MissingEnd);
        }
        Ok(self.waypoint_route())
    }

    pub fn set_computed(&mut self, route: Route) {
        tracing::info!("Computed route received ({} points)", route.len());
        self.computed = Some(route);
        self.invalidate();
    }

    pub fn import(&mut self, route: Route) {
        tracing::info!("Route imported ({} points)", route.len());
        self.imported = Some(route);
        self.invalidate();
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.imported = None;
        self.computed = None;
        self.invalidate();
    }

    pub fn active_route(&self) -> &Route {
        &self.active
    }

    pub fn active_source(&self) -> ActiveSource {
        self.source
    }

    pub fn shape(&self) -> RouteShape {
        match self.source {
            ActiveSource::Imported => RouteShape::Discrete,
            ActiveSource::Computed | ActiveSource::Waypoints => RouteShape::Continuous,
        }
    }

    pub fn series(&self) -> &ProgressSeries {
        &self.series
    }

    pub fn position_at(&self, progress: f64) -> Option<RoutePosition> {
        position_at_progress(&self.active, progress)
    }

    pub fn hover(
        &self,
        cursor: LatLng,
        projection: &dyn MapProjection,
        options: &HoverOptions,
    ) -> Option<HoverSelection> {
        find_hover(&self.active, self.shape(), cursor, projection, options)
    }

    pub fn playback(&self) -> &PlaybackScheduler<F> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackScheduler<F> {
        &mut self.playback
    }

    pub fn start_playback(&mut self) -> Result<(), RouteError> {
        self.playback.start(self.active.clone())
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    pub fn on_frame(
        &mut self,
        id: FrameId,
        timestamp_ms: f64,
        observer: &mut dyn PlaybackObserver,
    ) -> FrameOutcome {
        self.playback.on_frame(id, timestamp_ms, observer)
    }

    fn invalidate(&mut self) {
        self.playback.stop();

        let (source, route) = if let Some(route) = &self.imported {
            (ActiveSource::Imported, route.clone())
        } else if let Some(route) = &self.computed {
            (ActiveSource::Computed, route.clone())
        } else {
            (ActiveSource::Waypoints, self.waypoint_route())
        };

        self.series = build_series(&route);
        self.active = route;
        self.source = source;
        tracing::debug!(
            "Active route rebuilt from {:?} ({} points, chartable: {})",
            self.source,
            self.active.len(),
            self.series.is_chartable()
        );
    }
}
