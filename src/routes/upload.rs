use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};

use crate::error::AppError;
use crate::pipeline::parse;
use crate::routes::route::{store_route, RouteSummary};
use crate::state::AppState;
use crate::types::route::{FileFormat, RouteShape};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RouteSummary>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            file_bytes = Some(field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let format = FileFormat::from_filename(&filename)
        .ok_or_else(|| AppError::BadRequest("Unsupported file format, expected .gpx or .srt".to_string()))?;

    tracing::info!("Parsing {} file: {}", format.as_str(), filename);

    let parsed = parse::parse(&bytes, format)?;
    let summary = store_route(
        &state,
        parsed.points,
        RouteShape::Discrete,
        Some(parsed.file_format.as_str()),
    )?;

    tracing::info!(
        "Imported file {} as route {} ({} points, {:.2} km)",
        filename,
        summary.route_id,
        summary.point_count,
        summary.total_distance_km
    );

    Ok(Json(summary))
}
