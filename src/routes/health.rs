use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::types::route::FileFormat;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "import_formats": [FileFormat::Gpx.as_str(), FileFormat::Srt.as_str()],
        "cached_routes": state.route_count(),
        "hover_threshold_px": state.config.hover_threshold_px,
    }))
}
