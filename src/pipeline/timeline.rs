use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::pipeline::playback::{
    FrameOutcome, ManualFrames, PlaybackObserver, PlaybackScheduler, ProgressMapping,
};
use crate::types::point::RoutePosition;
use crate::types::route::Route;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFrame {
    pub timestamp_ms: f64,
    pub chart_index: usize,
    pub position: RoutePosition,
}

/// Collects what a scheduler emits, in order.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub positions: Vec<RoutePosition>,
    pub chart_markers: Vec<usize>,
}

impl PlaybackObserver for FrameRecorder {
    fn on_position(&mut self, position: &RoutePosition) {
        self.positions.push(*position);
    }

    fn on_chart_marker(&mut self, index: usize) {
        self.chart_markers.push(index);
    }
}

/// Plays `route` against a display refreshing every `frame_interval_ms` and
/// returns every emitted frame, stopping once playback completes or after
/// `max_frames` display frames.
pub fn simulate(
    route: Route,
    mapping: ProgressMapping,
    frame_interval_ms: f64,
    max_frames: usize,
) -> Result<Vec<PlaybackFrame>, RouteError> {
    if !(frame_interval_ms.is_finite() && frame_interval_ms > 0.0) {
        return Err(RouteError::InvalidRate(format!(
            "frame interval must be positive, got {}",
            frame_interval_ms
        )));
    }

    let mut scheduler = PlaybackScheduler::new(ManualFrames::new(), mapping);
    scheduler.start(route)?;

    let mut recorder = FrameRecorder::default();
    let mut frames = Vec::new();
    for tick in 0..max_frames {
        let Some(id) = scheduler.frames_mut().take_pending() else {
            break;
        };
        let timestamp_ms = tick as f64 * frame_interval_ms;
        match scheduler.on_frame(id, timestamp_ms, &mut recorder) {
            FrameOutcome::Emitted(position) | FrameOutcome::Finished(position) => {
                frames.push(PlaybackFrame {
                    timestamp_ms,
                    chart_index: position.index,
                    position,
                });
            }
            FrameOutcome::Skipped | FrameOutcome::Stale => {}
        }
        if !scheduler.is_playing() {
            break;
        }
    }

    if scheduler.is_playing() {
        tracing::warn!("Playback simulation hit the {} frame limit", max_frames);
        scheduler.stop();
    }

    Ok(frames)
}
