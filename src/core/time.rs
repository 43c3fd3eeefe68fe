//! Frame timing for driving the fractal update loop

use std::time::{Duration, Instant};

/// Longest frame step handed to the simulation. Long stalls (debugger,
/// window drag) would otherwise make every part jump a full turn.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(250);

/// How the timer produces per-frame deltas
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStep {
    /// Measure real elapsed time between ticks
    Wall,
    /// Advance by the same step every tick (deterministic playback)
    Fixed(Duration),
}

/// Tracks frame timing and produces clamped frame deltas
pub struct FrameTimer {
    step: TimeStep,
    last_frame: Instant,
    delta: Duration,
    max_delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a wall-clock timer
    pub fn new() -> Self {
        Self::with_step(TimeStep::Wall)
    }

    /// Create a timer that advances by `step` every tick
    pub fn fixed(step: Duration) -> Self {
        Self::with_step(TimeStep::Fixed(step))
    }

    fn with_step(step: TimeStep) -> Self {
        Self {
            step,
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            max_delta: DEFAULT_MAX_DELTA,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Override the delta clamp
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Call once per frame; returns the clamped delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = match self.step {
            TimeStep::Wall => now - self.last_frame,
            TimeStep::Fixed(step) => step,
        };
        self.last_frame = now;

        if raw > self.max_delta {
            log::debug!(
                "Clamping frame delta {:.1}ms to {:.1}ms",
                raw.as_secs_f64() * 1000.0,
                self.max_delta.as_secs_f64() * 1000.0
            );
        }
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total simulated time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
