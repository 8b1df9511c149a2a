use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, RouteError};
use crate::pipeline::progress::position_at_progress;
use crate::pipeline::projection::WebMercatorViewport;
use crate::pipeline::proximity::{find_hover, HoverOptions};
use crate::state::{AppState, StoredRoute};
use crate::types::point::{GeoPoint, HoverSelection, LatLng, RoutePosition};
use crate::types::route::{Route, RouteShape};
use crate::types::series::ProgressSeries;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/routes", post(create_route))
        .route("/api/routes/:route_id/series", get(series))
        .route("/api/routes/:route_id/position", get(position))
        .route("/api/routes/:route_id/hover", post(hover))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub shape: RouteShape,
    pub point_count: usize,
    pub total_distance_km: f64,
}

/// Validates, stores and summarizes a route.
pub(crate) fn store_route(
    state: &AppState,
    points: Vec<GeoPoint>,
    shape: RouteShape,
    file_type: Option<&str>,
) -> Result<RouteSummary, AppError> {
    if let Some(bad) = points
        .iter()
        .position(|p| !(p.lat.is_finite() && p.lng.is_finite()) || p.alt.is_some_and(|a| !a.is_finite()))
    {
        return Err(AppError::BadRequest(format!(
            "Point {} has non-finite coordinates",
            bad
        )));
    }

    let stored = StoredRoute::new(Route::new(points), shape);
    let route_id = Uuid::new_v4().to_string();
    let summary = RouteSummary {
        route_id: route_id.clone(),
        file_type: file_type.map(str::to_string),
        shape,
        point_count: stored.route.len(),
        total_distance_km: stored.series.total_distance_km(),
    };
    state.insert(route_id, stored);
    Ok(summary)
}

pub(crate) fn load_route(state: &AppState, route_id: &str) -> Result<StoredRoute, AppError> {
    state
        .get(route_id)
        .ok_or_else(|| AppError::NotFound(route_id.to_string()))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateRouteRequest {
    points: Vec<GeoPoint>,
    #[serde(default)]
    shape: RouteShape,
}

async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<Json<RouteSummary>, AppError> {
    let summary = store_route(&state, req.points, req.shape, None)?;
    tracing::info!(
        "Stored {:?} route {} ({} points, {:.2} km)",
        summary.shape,
        summary.route_id,
        summary.point_count,
        summary.total_distance_km
    );
    Ok(Json(summary))
}

async fn series(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<ProgressSeries>, AppError> {
    let stored = load_route(&state, &route_id)?;
    Ok(Json(stored.series))
}

#[derive(Deserialize)]
struct PositionQuery {
    progress: f64,
}

async fn position(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<RoutePosition>, AppError> {
    if !(0.0..=1.0).contains(&query.progress) {
        return Err(AppError::BadRequest(format!(
            "Invalid progress: {}. Must be between 0 and 1",
            query.progress
        )));
    }
    let stored = load_route(&state, &route_id)?;
    let position = position_at_progress(&stored.route, query.progress).ok_or(RouteError::EmptyRoute)?;
    Ok(Json(position))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct HoverRequest {
    cursor: LatLng,
    viewport: WebMercatorViewport,
    threshold_px: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct HoverResponse {
    selection: Option<HoverSelection>,
}

fn validate_viewport(viewport: &WebMercatorViewport) -> Result<(), AppError> {
    const MAX_ZOOM: f64 = 23.0;

    if !(0.0..=MAX_ZOOM).contains(&viewport.zoom) {
        return Err(AppError::BadRequest(format!(
            "Invalid zoom: {}. Must be between 0 and {}",
            viewport.zoom, MAX_ZOOM
        )));
    }
    if !(viewport.width_px > 0.0 && viewport.height_px > 0.0)
        || !(viewport.width_px.is_finite() && viewport.height_px.is_finite())
    {
        return Err(AppError::BadRequest(format!(
            "Invalid viewport size: {}x{}",
            viewport.width_px, viewport.height_px
        )));
    }
    Ok(())
}

async fn hover(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<HoverRequest>,
) -> Result<Json<HoverResponse>, AppError> {
    validate_viewport(&req.viewport)?;
    let stored = load_route(&state, &route_id)?;

    let options = HoverOptions {
        threshold_px: req
            .threshold_px
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(state.config.hover_threshold_px),
        ..HoverOptions::default()
    };

    let selection = find_hover(&stored.route, stored.shape, req.cursor, &req.viewport, &options);
    Ok(Json(HoverResponse { selection }))
}
