use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::pipeline::progress::position_at_progress;
use crate::types::point::RoutePosition;
use crate::types::route::Route;

pub type FrameId = u64;

/// Schedules "call me on the next rendering frame" callbacks.
///
/// The scheduler keeps at most one request pending and cancels it before
/// issuing another.
pub trait FrameSource {
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

/// Receives the two per-frame side effects of playback.
pub trait PlaybackObserver {
    fn on_position(&mut self, position: &RoutePosition);
    fn on_chart_marker(&mut self, index: usize);
}

/// A frame source driven by hand: requests are recorded and fired by whoever
/// owns the clock.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: FrameId,
    pending: Option<FrameId>,
    requested: usize,
    cancelled: Vec<FrameId>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Removes the pending request so it can be delivered.
    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> &[FrameId] {
        &self.cancelled
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        self.requested += 1;
        self.pending = Some(self.next_id);
        self.next_id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
        self.cancelled.push(id);
    }
}

/// Maps elapsed playback time to a progress value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProgressMapping {
    /// The whole route takes `duration_ms`, interpolating between points.
    FixedDuration { duration_ms: f64 },
    /// One route point per source frame, as captured at `fps`.
    SourceFrameRate { fps: f64 },
}

impl ProgressMapping {
    pub fn fixed_duration(duration_ms: f64) -> Result<Self, RouteError> {
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            return Err(RouteError::InvalidRate(format!(
                "duration must be positive, got {}",
                duration_ms
            )));
        }
        Ok(ProgressMapping::FixedDuration { duration_ms })
    }

    pub fn source_frame_rate(fps: f64) -> Result<Self, RouteError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(RouteError::InvalidRate(format!("fps must be positive, got {}", fps)));
        }
        Ok(ProgressMapping::SourceFrameRate { fps })
    }

    /// Re-checks a mapping built directly from its variant fields.
    pub fn validated(self) -> Result<Self, RouteError> {
        match self {
            ProgressMapping::FixedDuration { duration_ms } => Self::fixed_duration(duration_ms),
            ProgressMapping::SourceFrameRate { fps } => Self::source_frame_rate(fps),
        }
    }

    /// Progress after `elapsed_ms` on a route of `point_count` points.
    /// Non-decreasing in `elapsed_ms`.
    pub fn progress(&self, elapsed_ms: f64, point_count: usize) -> f64 {
        let elapsed_ms = elapsed_ms.max(0.0);
        match *self {
            ProgressMapping::FixedDuration { duration_ms } => (elapsed_ms / duration_ms).min(1.0),
            ProgressMapping::SourceFrameRate { fps } => {
                let last = point_count.saturating_sub(1);
                if last == 0 {
                    return 1.0;
                }
                let frame = (elapsed_ms * fps / 1000.0).floor() as usize;
                frame.min(last) as f64 / last as f64
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub start_timestamp: Option<f64>,
    pub elapsed_ms: f64,
    pub current_index: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Not the pending frame, or playback is idle.
    Stale,
    /// Progress did not advance; nothing emitted, next frame requested.
    Skipped,
    Emitted(RoutePosition),
    /// Final position emitted; playback is idle again.
    Finished(RoutePosition),
}

pub struct PlaybackScheduler<F: FrameSource> {
    frames: F,
    mapping: ProgressMapping,
    route: Option<Route>,
    state: PlaybackState,
    pending: Option<FrameId>,
    last_progress: Option<f64>,
}

impl<F: FrameSource> PlaybackScheduler<F> {
    pub fn new(frames: F, mapping: ProgressMapping) -> Self {
        Self {
            frames,
            mapping,
            route: None,
            state: PlaybackState::default(),
            pending: None,
            last_progress: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.phase == PlaybackPhase::Playing
    }

    pub fn mapping(&self) -> ProgressMapping {
        self.mapping
    }

    /// Takes effect on the next `start`.
    pub fn set_mapping(&mut self, mapping: ProgressMapping) -> Result<(), RouteError> {
        self.mapping = mapping.validated()?;
        Ok(())
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn start(&mut self, route: Route) -> Result<(), RouteError> {
        if route.len() < 2 {
            return Err(RouteError::InvalidRoute(route.len()));
        }
        self.mapping.validated()?;

        self.stop();

        tracing::info!("Playback started ({} points, {:?})", route.len(), self.mapping);
        self.route = Some(route);
        self.state.phase = PlaybackPhase::Playing;
        self.pending = Some(self.frames.request_frame());
        Ok(())
    }

    /// Cancels the pending frame and returns to idle. No-op when idle.
    pub fn stop(&mut self) {
        if !self.is_playing() && self.pending.is_none() {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.frames.cancel_frame(id);
        }
        self.reset();
        tracing::info!("Playback stopped");
    }

    pub fn on_frame(
        &mut self,
        id: FrameId,
        timestamp_ms: f64,
        observer: &mut dyn PlaybackObserver,
    ) -> FrameOutcome {
        if !self.is_playing() || self.pending != Some(id) {
            return FrameOutcome::Stale;
        }
        self.pending = None;

        let Some(route) = self.route.clone() else {
            self.reset();
            return FrameOutcome::Stale;
        };

        let start = *self.state.start_timestamp.get_or_insert(timestamp_ms);
        self.state.elapsed_ms = (timestamp_ms - start).max(0.0);

        let progress = self.mapping.progress(self.state.elapsed_ms, route.len());
        let finished = progress >= 1.0;
        let advanced = self.last_progress.map_or(true, |last| progress > last);

        if !advanced && !finished {
            self.pending = Some(self.frames.request_frame());
            return FrameOutcome::Skipped;
        }

        let Some(position) = position_at_progress(&route, progress) else {
            self.reset();
            return FrameOutcome::Stale;
        };

        let exact_index = progress * (route.len() - 1) as f64;
        self.state.current_index = position.index;
        self.state.fraction = (exact_index - position.index as f64).clamp(0.0, 1.0);
        self.last_progress = Some(progress);

        observer.on_position(&position);
        observer.on_chart_marker(position.index);

        if finished {
            tracing::info!(
                "Playback finished at point {} after {:.0} ms",
                position.index,
                self.state.elapsed_ms
            );
            self.reset();
            FrameOutcome::Finished(position)
        } else {
            self.pending = Some(self.frames.request_frame());
            FrameOutcome::Emitted(position)
        }
    }

    fn reset(&mut self) {
        self.route = None;
        self.state = PlaybackState::default();
        self.pending = None;
        self.last_progress = None;
    }
}
