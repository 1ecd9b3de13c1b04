//! Fixtures shared by the graphics tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::device::{HeadlessDevice, SharedDevice};

use super::rasterizer::{GlyphRasterizer, RasterizedGlyph};

pub(crate) const VIEW_W: u32 = 800;
pub(crate) const VIEW_H: u32 = 600;

/// An 800×600 headless device, both as itself and as the shared trait object.
pub(crate) fn headless() -> (Rc<RefCell<HeadlessDevice>>, SharedDevice) {
    wrap(HeadlessDevice::new(Viewport::new(VIEW_W, VIEW_H)))
}

pub(crate) fn wrap(device: HeadlessDevice) -> (Rc<RefCell<HeadlessDevice>>, SharedDevice) {
    let device = Rc::new(RefCell::new(device));
    let shared: SharedDevice = device.clone();
    (device, shared)
}

/// Rasterizer with fixed metrics: 8px cells, 16px lines, lowercase letters
/// 12px tall, everything else full height.
pub(crate) struct FixedRasterizer {
    empty: bool,
}

impl Default for FixedRasterizer {
    fn default() -> Self {
        Self { empty: false }
    }
}

impl FixedRasterizer {
    pub(crate) fn empty() -> Self {
        Self { empty: true }
    }
}

impl GlyphRasterizer for FixedRasterizer {
    fn line_height(&self) -> u32 {
        16
    }

    fn rasterize(&self, ch: char) -> Option<RasterizedGlyph> {
        if self.empty || !ch.is_ascii() {
            return None;
        }
        let height = if ch.is_ascii_lowercase() { 12 } else { 16 };
        let mut cell = RasterizedGlyph::blank(8, height);
        if ch != ' ' {
            cell.coverage.fill(255);
        }
        Some(cell)
    }
}
