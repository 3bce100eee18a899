//! Frame clock with variable or injected timestep

use std::time::Instant;

/// Longest wall-clock frame `tick` will report, in seconds
const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks simulation time and the elapsed time of the current frame.
///
/// Live drivers call [`FrameClock::tick`] once per frame to sample the wall
/// clock; stalls longer than a quarter second are clamped there. Headless
/// drivers and tests call [`FrameClock::advance`] with an explicit delta,
/// which is applied as given so runs are reproducible.
pub struct FrameClock {
    /// Total elapsed simulation time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Number of frames advanced so far
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the wall clock. Call once per frame.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            return self.advance(0.0);
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed.min(MAX_FRAME_TIME))
    }

    /// Advance by an explicit delta. Negative or non-finite deltas count as 0.
    /// Returns the delta actually applied.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.delta_time = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }
}
