//! sgl: an immediate-mode 2D batched renderer.
//!
//! Shapes and textured sprites (including bitmap text) are accumulated into
//! vertex batches and submitted in as few draw calls as possible through a
//! [`device::GraphicsDevice`]. A winit/wgpu [`window::Runtime`] drives a
//! [`core::Game`] with a fixed-timestep loop.

pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod graphics;
pub mod input;
pub mod logging;
pub mod paint;
pub mod time;
pub mod window;
