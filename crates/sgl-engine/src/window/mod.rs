//! Window + runtime loop.
//!
//! Owns the `winit` event loop and window, and drives a [`Game`](crate::core::Game)
//! on top of the GPU layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
