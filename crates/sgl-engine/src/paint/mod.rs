//! Color model shared by batches, textures and the runtime clear color.

pub mod color;

pub use color::Color;
