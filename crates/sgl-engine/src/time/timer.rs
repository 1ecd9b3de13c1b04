/// Frames- and updates-per-second counters over a rolling one-second window.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    counter: f32,
    fps: u32,
    fps_count: u32,
    ups: u32,
    ups_count: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the window by `dt` seconds, publishing the counts once a
    /// full second has elapsed.
    pub fn tick(&mut self, dt: f32) {
        self.counter += dt;
        if self.counter > 1.0 {
            self.fps = self.fps_count;
            self.ups = self.ups_count;
            self.fps_count = 0;
            self.ups_count = 0;
            self.counter -= 1.0;
        }
    }

    pub fn count_frame(&mut self) {
        self.fps_count += 1;
    }

    pub fn count_update(&mut self) {
        self.ups_count += 1;
    }

    /// Frames in the last full second, or the running count before the
    /// first second completes.
    pub fn fps(&self) -> u32 {
        if self.fps > 0 { self.fps } else { self.fps_count }
    }

    pub fn ups(&self) -> u32 {
        if self.ups > 0 { self.ups } else { self.ups_count }
    }
}

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedStep {
    interval: f32,
    accumulator: f32,
}

impl FixedStep {
    /// `1 / ups` seconds per update.
    pub fn new(ups: u32) -> Self {
        Self {
            interval: 1.0 / ups.max(1) as f32,
            accumulator: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Adds `dt` and returns how many whole intervals are now due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            steps += 1;
        }
        steps
    }

    /// Fraction of an interval left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── counters ──────────────────────────────────────────────────────────

    #[test]
    fn counts_publish_after_a_second() {
        let mut t = Timer::new();
        for _ in 0..3 {
            t.count_frame();
        }
        t.count_update();
        assert_eq!(t.fps(), 3);

        t.tick(0.6);
        t.tick(0.6);
        assert_eq!(t.fps(), 3);
        assert_eq!(t.ups(), 1);

        t.count_frame();
        assert_eq!(t.fps(), 3);
    }

    // ── fixed step ────────────────────────────────────────────────────────

    #[test]
    fn accumulates_partial_intervals() {
        let mut step = FixedStep::new(4);
        assert_eq!(step.advance(0.1), 0);
        assert_eq!(step.advance(0.2), 1);
        assert!((step.alpha() - 0.2).abs() < 1e-4);
        assert_eq!(step.advance(0.55), 2);
    }

    #[test]
    fn zero_ups_is_one_per_second() {
        assert_eq!(FixedStep::new(0).interval(), 1.0);
    }
}
