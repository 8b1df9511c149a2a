use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid SRT: {0}")]
    InvalidSrt(String),
    #[error("No route points found in file")]
    EmptyFile,
}

/// Route-level failures. Playback refuses to start on these; they are never fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("Invalid route: need at least 2 points for playback, got {0}")]
    InvalidRoute(usize),
    #[error("Route has no points")]
    EmptyRoute,
    #[error("Invalid playback rate: {0}")]
    InvalidRate(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Add at least 2 waypoints (got {0})")]
    TooFewWaypoints(usize),
    #[error("No start waypoint set")]
    MissingStart,
    #[error("No end waypoint set")]
    MissingEnd,
    #[error("Waypoint not found: {0}")]
    UnknownWaypoint(u64),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Route not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Parse(_) | AppError::Route(_) | AppError::Plan(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
