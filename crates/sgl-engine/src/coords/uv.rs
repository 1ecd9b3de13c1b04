/// Normalized texture-space rectangle.
///
/// `(s0, t0)` is the texel corner mapped to a quad's drawn top-left,
/// `(s1, t1)` the one mapped to its bottom-right.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect { s0: 0.0, t0: 0.0, s1: 1.0, t1: 1.0 };

    #[inline]
    pub const fn new(s0: f32, t0: f32, s1: f32, t1: f32) -> Self {
        Self { s0, t0, s1, t1 }
    }

    /// UVs of a pixel rectangle inside a `width × height` image.
    pub fn from_pixels(x: f32, y: f32, w: f32, h: f32, width: f32, height: f32) -> Self {
        let inv_w = 1.0 / width.max(1.0);
        let inv_h = 1.0 / height.max(1.0);
        Self::new(x * inv_w, y * inv_h, (x + w) * inv_w, (y + h) * inv_h)
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}
