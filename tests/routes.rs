use axum::{body::to_bytes, http::Request, Router};
use flightpath_rs::{config::Config, routes, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::from_env();
    let state = AppState::new(config);
    Router::new()
        .merge(routes::route::router())
        .merge(routes::playback::router())
        .with_state(state)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (axum::http::StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(json.to_string())
        }
        None => axum::body::Body::empty(),
    };
    let response = app
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: Router, points: Value, shape: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/routes",
        Some(json!({ "points": points, "shape": shape })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    json["route_id"].as_str().expect("route id").to_string()
}

fn equator_points() -> Value {
    json!([
        { "lat": 0.0, "lng": 0.0, "alt": 0.0 },
        { "lat": 0.0, "lng": 1.0, "alt": 100.0 },
        { "lat": 0.0, "lng": 2.0, "alt": 0.0 }
    ])
}

#[tokio::test]
async fn series_reports_cumulative_distance_and_altitude() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;

    let (status, json) = send(app, "GET", &format!("/api/routes/{id}/series"), None).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let distances: Vec<f64> = json["cumulative_distance_km"]
        .as_array()
        .expect("distances")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect();
    assert_eq!(distances[0], 0.0);
    assert!((distances[1] - 111.19).abs() < 0.01);
    assert!((distances[2] - 222.39).abs() < 0.01);
    assert_eq!(json["altitude_m"], json!([0.0, 100.0, 0.0]));
}

#[tokio::test]
async fn position_at_half_progress_lands_on_middle_point() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;

    let (status, json) = send(
        app,
        "GET",
        &format!("/api/routes/{id}/position?progress=0.5"),
        None,
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["index"], 1);
    assert_eq!(json["lng"], 1.0);
    assert_eq!(json["alt"], 100.0);
}

#[tokio::test]
async fn position_rejects_out_of_range_progress() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;
    let (status, _) = send(app, "GET", &format!("/api/routes/{id}/position?progress=1.5"), None).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn position_on_empty_route_is_rejected() {
    let app = app();
    let id = create(app.clone(), json!([]), "discrete").await;
    let (status, json) = send(app, "GET", &format!("/api/routes/{id}/position?progress=0.3"), None).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Route has no points");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = send(app(), "GET", "/api/routes/missing/series", None).await;
    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hover_selects_nearby_vertex_and_clears_far_away() {
    let app = app();
    let points = json!([
        { "lat": 55.7500, "lng": 37.6000, "alt": 150.0 },
        { "lat": 55.7500, "lng": 37.6100, "alt": 160.0 }
    ]);
    let id = create(app.clone(), points, "continuous").await;
    let viewport = json!({
        "center": { "lat": 55.75, "lng": 37.605 },
        "zoom": 15.0,
        "width_px": 1000.0,
        "height_px": 800.0
    });

    // A few pixels north of the segment midpoint.
    let (status, json) = send(
        app.clone(),
        "POST",
        &format!("/api/routes/{id}/hover"),
        Some(json!({ "cursor": { "lat": 55.75005, "lng": 37.605 }, "viewport": viewport })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let selection = &json["selection"];
    assert!(selection.is_object(), "expected a selection, got {json}");
    assert!(selection["index"].is_null());
    let lng = selection["point"]["lng"].as_f64().expect("lng");
    assert!((lng - 37.605).abs() < 1e-6);
    let alt = selection["point"]["alt"].as_f64().expect("alt");
    assert!((alt - 155.0).abs() < 1e-3);

    let (status, json) = send(
        app,
        "POST",
        &format!("/api/routes/{id}/hover"),
        Some(json!({ "cursor": { "lat": 55.7600, "lng": 37.605 }, "viewport": viewport })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert!(json["selection"].is_null());
}

#[tokio::test]
async fn hover_rejects_bad_viewport() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;
    let (status, _) = send(
        app,
        "POST",
        &format!("/api/routes/{id}/hover"),
        Some(json!({
            "cursor": { "lat": 0.0, "lng": 1.0 },
            "viewport": { "center": { "lat": 0.0, "lng": 1.0 }, "zoom": 40.0, "width_px": 800.0, "height_px": 600.0 }
        })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn playback_timeline_ends_on_last_point() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;

    let (status, json) = send(
        app,
        "POST",
        &format!("/api/routes/{id}/playback"),
        Some(json!({ "mode": "duration", "duration_ms": 1000.0, "frame_interval_ms": 100.0 })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["mapping"]["mode"], "fixed_duration");

    let frames = json["frames"].as_array().expect("frames");
    assert_eq!(frames.len(), 11);
    assert_eq!(json["frame_count"], 11);
    let last = frames.last().expect("last frame");
    assert_eq!(last["chart_index"], 2);
    assert_eq!(last["position"]["lng"], 2.0);
    assert_eq!(frames[0]["position"]["lng"], 0.0);
}

#[tokio::test]
async fn playback_by_source_frame_rate_visits_each_point_once() {
    let app = app();
    let id = create(app.clone(), equator_points(), "discrete").await;

    let (status, json) = send(
        app,
        "POST",
        &format!("/api/routes/{id}/playback"),
        Some(json!({ "mode": "frame_rate", "fps": 10.0, "frame_interval_ms": 25.0 })),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let indices: Vec<u64> = json["frames"]
        .as_array()
        .expect("frames")
        .iter()
        .map(|f| f["chart_index"].as_u64().expect("index"))
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn playback_refuses_single_point_route() {
    let app = app();
    let id = create(app.clone(), json!([{ "lat": 1.0, "lng": 1.0 }]), "discrete").await;
    let (status, json) = send(app, "POST", &format!("/api/routes/{id}/playback"), Some(json!({}))).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("error").contains("at least 2 points"));
}
