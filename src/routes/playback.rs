use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, RouteError};
use crate::pipeline::playback::ProgressMapping;
use crate::pipeline::timeline::{simulate, PlaybackFrame};
use crate::routes::route::load_route;
use crate::state::AppState;

const MAX_TIMELINE_FRAMES: usize = 100_000;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/routes/:route_id/playback", post(playback))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum PlaybackMode {
    #[default]
    Duration,
    FrameRate,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlaybackRequest {
    #[serde(default)]
    mode: PlaybackMode,
    duration_ms: Option<f64>,
    fps: Option<f64>,
    frame_interval_ms: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct PlaybackResponse {
    mapping: ProgressMapping,
    frame_count: usize,
    frames: Vec<PlaybackFrame>,
}

/// Display frames needed to reach the end of the route, with slack for the
/// first frame and the completing one.
fn frame_budget(mapping: ProgressMapping, point_count: usize, frame_interval_ms: f64) -> f64 {
    let total_ms = match mapping {
        ProgressMapping::FixedDuration { duration_ms } => duration_ms,
        ProgressMapping::SourceFrameRate { fps } => {
            point_count.saturating_sub(1) as f64 * 1000.0 / fps
        }
    };
    (total_ms / frame_interval_ms).ceil() + 2.0
}

async fn playback(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(req): Json<PlaybackRequest>,
) -> Result<Json<PlaybackResponse>, AppError> {
    let stored = load_route(&state, &route_id)?;
    if stored.route.len() < 2 {
        return Err(RouteError::InvalidRoute(stored.route.len()).into());
    }

    let mapping = match req.mode {
        PlaybackMode::Duration => ProgressMapping::fixed_duration(
            req.duration_ms.unwrap_or(state.config.playback_duration_ms),
        )?,
        PlaybackMode::FrameRate => {
            ProgressMapping::source_frame_rate(req.fps.unwrap_or(state.config.source_fps))?
        }
    };
    let frame_interval_ms = req.frame_interval_ms.unwrap_or(state.config.frame_interval_ms);
    if !(frame_interval_ms.is_finite() && frame_interval_ms > 0.0) {
        return Err(AppError::BadRequest(format!(
            "Invalid frame_interval_ms: {}",
            frame_interval_ms
        )));
    }

    let budget = frame_budget(mapping, stored.route.len(), frame_interval_ms);
    if budget > MAX_TIMELINE_FRAMES as f64 {
        return Err(AppError::BadRequest(format!(
            "Playback would need {:.0} frames; max allowed is {}",
            budget, MAX_TIMELINE_FRAMES
        )));
    }

    tracing::info!(
        "Simulating playback for route {} ({:?}, {:.1} ms frames)",
        route_id,
        mapping,
        frame_interval_ms
    );

    let frames = simulate(stored.route, mapping, frame_interval_ms, budget as usize)?;

    Ok(Json(PlaybackResponse {
        mapping,
        frame_count: frames.len(),
        frames,
    }))
}
