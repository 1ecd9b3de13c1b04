use anyhow::Result;

use crate::input::Key;

use super::ctx::GameCtx;

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// Per frame the runtime calls `process_input` once, `update` zero or more
/// times at the fixed update rate, then `render` once.
pub trait Game {
    /// Called once after the window and graphics device exist.
    fn initialize(&mut self, ctx: &mut GameCtx<'_>) -> Result<()>;

    /// Called once before the device is torn down.
    fn shutdown(&mut self, ctx: &mut GameCtx<'_>) {
        let _ = ctx;
    }

    /// Defaults to exiting on Escape.
    fn process_input(&mut self, ctx: &mut GameCtx<'_>) {
        if ctx.input().is_key_pressed(Key::Escape) {
            ctx.exit();
        }
    }

    /// Advances the simulation by `dt` seconds (the fixed update interval).
    fn update(&mut self, ctx: &mut GameCtx<'_>, dt: f32);

    fn render(&mut self, ctx: &mut GameCtx<'_>);
}
