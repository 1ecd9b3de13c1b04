//! Input subsystem.
//!
//! The public API does not expose winit types; `platform::winit` is the only
//! place platform codes are translated.

mod frame;
pub(crate) mod platform;
mod snapshot;
mod state;
mod types;

pub use frame::InputFrame;
pub use snapshot::InputSnapshot;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};
