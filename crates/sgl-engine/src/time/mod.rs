//! Frame timing: clamped deltas, fixed-step updates, FPS/UPS counting and
//! frame pacing.

mod clock;
mod timer;

pub use clock::{frame_interval, FrameClock, FramePacer, FrameTime};
pub use timer::{FixedStep, Timer};
