//! Contract between the runtime loop and an application.

mod ctx;
mod game;

pub use ctx::{FrameStats, GameCtx};
pub use game::Game;
