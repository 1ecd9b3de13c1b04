use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Produces clamped frame deltas.
///
/// The clamp keeps a fixed-step simulation from running hundreds of catch-up
/// updates after the process was paused or the window was dragged.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after initialization finished.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes when the next frame is due when presentation is not paced by
/// vsync.
#[derive(Debug, Clone)]
pub struct FramePacer {
    last_frame: Instant,
}

impl FramePacer {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
        }
    }

    /// Records that a frame was just presented.
    pub fn mark(&mut self, now: Instant) {
        self.last_frame = now;
    }

    /// Earliest instant the next frame should start at `fps` frames per second.
    pub fn next_deadline(&self, fps: u32) -> Instant {
        self.last_frame + frame_interval(fps)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_clamps_and_counts() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(10));
        let a = clock.tick();
        assert!(a.dt >= 0.005 && a.dt <= 0.010);
        let b = clock.tick();
        assert_eq!(b.frame_index, a.frame_index + 1);
    }

    #[test]
    fn pacer_deadline() {
        let now = Instant::now();
        let mut pacer = FramePacer::new();
        pacer.mark(now);
        assert_eq!(pacer.next_deadline(50), now + Duration::from_millis(20));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }
}
