use crate::coords::Viewport;
use crate::device::SharedDevice;
use crate::input::InputSnapshot;

/// Rates published by the runtime timer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub fps: u32,
    pub ups: u32,
    /// Interpolation factor between the last two updates, in `[0, 1)`.
    pub alpha: f32,
}

/// Per-call context handed to [`Game`](super::Game) callbacks.
pub struct GameCtx<'a> {
    device: &'a SharedDevice,
    input: &'a InputSnapshot,
    viewport: Viewport,
    stats: FrameStats,
    exit_requested: bool,
}

impl<'a> GameCtx<'a> {
    pub fn new(
        device: &'a SharedDevice,
        input: &'a InputSnapshot,
        viewport: Viewport,
        stats: FrameStats,
    ) -> Self {
        Self {
            device,
            input,
            viewport,
            stats,
            exit_requested: false,
        }
    }

    /// Shared device for constructing batches, textures and fonts.
    pub fn device(&self) -> &'a SharedDevice {
        self.device
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn input(&self) -> &'a InputSnapshot {
        self.input
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps
    }

    pub fn ups(&self) -> u32 {
        self.stats.ups
    }

    /// Asks the runtime to leave the loop after the current callback.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Game;
    use crate::graphics::test_support::{headless, VIEW_H, VIEW_W};
    use crate::input::{ButtonState, InputEvent, InputFrame, InputState, Key};

    struct Counter {
        updates: u32,
    }

    impl Game for Counter {
        fn initialize(&mut self, _ctx: &mut GameCtx<'_>) -> anyhow::Result<()> {
            Ok(())
        }

        fn update(&mut self, _ctx: &mut GameCtx<'_>, _dt: f32) {
            self.updates += 1;
        }

        fn render(&mut self, _ctx: &mut GameCtx<'_>) {}
    }

    #[test]
    fn default_input_handler_exits_on_escape() {
        let (_dev, shared) = headless();
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::Key { key: Key::Escape, state: ButtonState::Pressed, repeat: false },
        );
        let input = InputSnapshot::capture(&state, &frame);

        let mut game = Counter { updates: 0 };
        let mut ctx = GameCtx::new(
            &shared,
            &input,
            Viewport::new(VIEW_W, VIEW_H),
            FrameStats::default(),
        );
        game.update(&mut ctx, 1.0 / 30.0);
        assert!(!ctx.exit_requested());
        game.process_input(&mut ctx);
        assert!(ctx.exit_requested());
        assert_eq!(game.updates, 1);
    }
}
