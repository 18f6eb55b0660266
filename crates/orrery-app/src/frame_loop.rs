//! Variable-rate frame loop.
//!
//! The host asks for one [`FrameTime`] per displayed frame. Time comes from an
//! injected [`FrameClock`], so the loop runs identically under a
//! [`ManualClock`](crate::ManualClock) in tests.

use tracing::{debug, warn};

use crate::clock::{FrameClock, SystemClock};

/// Largest delta handed to the update step, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, no frame produced yet.
    Idle,
    Running,
    Stopped,
}

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since [`FrameLoop::start`].
    pub elapsed: f64,
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DELTA`].
    pub delta: f32,
    /// 1-based frame number.
    pub frame: u64,
}

pub struct FrameLoop<C: FrameClock = SystemClock> {
    clock: C,
    state: LoopState,
    origin: f64,
    previous: f64,
    frame_count: u64,
}

impl<C: FrameClock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: LoopState::Idle,
            origin: 0.0,
            previous: 0.0,
            frame_count: 0,
        }
    }

    /// Move from `Idle` to `Running` and record the clock origin.
    ///
    /// Returns `false` if the loop was already started or stopped.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        let now = self.clock.now();
        self.origin = now;
        self.previous = now;
        self.state = LoopState::Running;
        debug!("Frame loop started");
        true
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            self.state = LoopState::Stopped;
            debug!(frames = self.frame_count, "Frame loop stopped");
        }
    }

    /// Measure the next frame. `None` unless the loop is running.
    pub fn tick(&mut self) -> Option<FrameTime> {
        if self.state != LoopState::Running {
            return None;
        }

        let now = self.clock.now();
        let mut delta = (now - self.previous).max(0.0);
        self.previous = now;

        if delta > MAX_FRAME_DELTA {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
            delta = MAX_FRAME_DELTA;
        }

        self.frame_count += 1;
        Some(FrameTime {
            elapsed: now - self.origin,
            delta: delta as f32,
            frame: self.frame_count,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameLoop<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}
