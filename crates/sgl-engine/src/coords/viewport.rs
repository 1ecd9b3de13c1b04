use glam::Mat4;

/// Drawable size in pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Orthographic projection mapping pixel space (top-left origin, +Y down)
    /// to clip space.
    ///
    /// A degenerate viewport is treated as 1×1 so the matrix stays invertible.
    pub fn projection(self) -> Mat4 {
        let (w, h) = if self.is_valid() {
            (self.width as f32, self.height as f32)
        } else {
            (1.0, 1.0)
        };
        Mat4::orthographic_rh_gl(0.0, w, h, 0.0, -1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn projection_maps_corners_to_clip_space() {
        let p = Viewport::new(800, 600).projection();

        let tl = p.transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!((tl.x + 1.0).abs() < 1e-6 && (tl.y - 1.0).abs() < 1e-6, "{tl:?}");

        let br = p.transform_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((br.x - 1.0).abs() < 1e-6 && (br.y + 1.0).abs() < 1e-6, "{br:?}");
    }

    #[test]
    fn degenerate_viewport_falls_back_to_unit() {
        assert!(!Viewport::new(0, 600).is_valid());
        assert!(Viewport::new(1, 1).is_valid());
        assert_eq!(Viewport::new(0, 0).projection(), Viewport::new(1, 1).projection());
    }
}
