//! Host frame scheduling
//!
//! The browser hands out "call me before the next paint" requests that can be
//! cancelled. [`FrameLoop`] keeps at most one request pending and cancels it
//! as soon as the game leaves the playing phase, so no stray step runs against
//! a finished or reset session. [`FrameClock`] decides how many simulation
//! steps a callback is worth.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::sim::GamePhase;

/// Host primitive that invokes a callback before the next paint
pub trait FrameScheduler {
    type Handle: Copy;

    /// Ask for one callback; `None` if the host refused
    fn request_frame(&mut self) -> Option<Self::Handle>;

    /// Cancel a pending callback
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Owns the single pending frame request
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    /// Request a frame unless one is already pending
    pub fn ensure_running(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            log::warn!("Host refused a frame request");
        }
    }

    /// The pending callback fired (each request fires at most once)
    pub fn on_frame(&mut self) {
        self.pending = None;
    }

    /// Cancel any pending callback
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Keep frames coming while playing, stop otherwise
    pub fn sync(&mut self, phase: GamePhase) {
        if phase.wants_frames() {
            self.ensure_running();
        } else {
            self.stop();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

/// Converts host callback timestamps into a number of simulation steps
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Steps per second, or `None` for one step per callback
    fixed_hz: Option<f32>,
    accumulator: f64,
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new(fixed_hz: Option<f32>) -> Self {
        Self {
            fixed_hz,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Steps to run for a callback at `time_ms` (host timestamp, milliseconds)
    pub fn steps_for(&mut self, time_ms: f64) -> u32 {
        let Some(hz) = self.fixed_hz else {
            self.last_time = Some(time_ms);
            return 1;
        };

        let step_dt = 1.0 / f64::from(hz);
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            // First callback counts as exactly one step
            None => step_dt,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= step_dt && steps < MAX_SUBSTEPS {
            self.accumulator -= step_dt;
            steps += 1;
        }
        // Drop backlog we refused to simulate
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(step_dt);
        }
        steps
    }

    /// Forget timing history (after a pause between sessions)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}
