use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
    /// Pointer must be closer than this (in screen pixels) to select a route point.
    pub hover_threshold_px: f64,
    /// Full-route traversal time for duration-based playback.
    pub playback_duration_ms: f64,
    /// Capture rate of the telemetry source for frame-rate-based playback.
    pub source_fps: f64,
    /// Display refresh interval used when simulating a playback timeline.
    pub frame_interval_ms: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", 3000);
        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", 25);
        let cache_ttl_seconds = env_or("CACHE_TTL_SECONDS", 3600);

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            hover_threshold_px: positive_or("HOVER_THRESHOLD_PX", 15.0),
            playback_duration_ms: positive_or("PLAYBACK_DURATION_MS", 2000.0),
            source_fps: positive_or("SOURCE_FPS", 30.0),
            frame_interval_ms: positive_or("FRAME_INTERVAL_MS", 1000.0 / 60.0),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn positive_or(key: &str, default: f64) -> f64 {
    let value: f64 = env_or(key, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}
