//! Coordinate types shared by batches and devices.
//!
//! Canonical CPU space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! Batches transform geometry to clip space on the CPU using the viewport
//! projection, so shaders receive positions as-is.

mod uv;
mod viewport;

pub use uv::UvRect;
pub use viewport::Viewport;
