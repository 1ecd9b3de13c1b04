//! Immediate-mode 2D drawing.
//!
//! A frame is drawn through batches: `begin`, any number of draw calls,
//! `end`. Geometry is transformed on the CPU and handed to the device in as
//! few draw calls as possible.

mod batch;
mod camera;
mod error;
mod font;
mod rasterizer;
mod shape_batch;
mod sprite_batch;
mod texture;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::DEFAULT_CAPACITY;
pub use camera::{Camera, SharedCamera, MIN_ZOOM};
pub use error::{BatchError, FontError, TextureError};
pub use font::{Font, Glyph, SYSTEM_MONOSPACE_FONTS};
pub use rasterizer::{FontdueRasterizer, GlyphRasterizer, RasterizedGlyph};
pub use shape_batch::{CornerColors, DrawMode, LineStyle, ShapeBatch, DEFAULT_LINE_WIDTH};
pub use sprite_batch::{DrawOptions, SpriteBatch};
pub use texture::{Texture, TextureRegion, TextureSource};
