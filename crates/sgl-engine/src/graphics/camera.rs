use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};

/// Smallest zoom factor a camera accepts.
pub const MIN_ZOOM: f32 = 0.01;

/// A camera shared between batches. Batches read it at `begin` only.
pub type SharedCamera = Rc<RefCell<Camera>>;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Snapshot {
    position: Vec2,
    origin: Vec2,
    zoom: f32,
    rotation: f32,
}

/// 2D view transform: translation, zoom, rotation (degrees) around an origin.
///
/// The view matrix is cached and rebuilt only when one of its inputs changed
/// since the last build.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    origin: Vec2,
    zoom: f32,
    rotation: f32,

    view: Mat4,
    built_from: Option<Snapshot>,
    rebuilds: u64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            zoom: 1.0,
            rotation: 0.0,
            view: Mat4::IDENTITY,
            built_from: None,
            rebuilds: 0,
        }
    }

    pub fn shared(self) -> SharedCamera {
        Rc::new(RefCell::new(self))
    }

    // ── position ───────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    pub fn translate_x(&mut self, dx: f32) {
        self.position.x += dx;
    }

    pub fn translate_y(&mut self, dy: f32) {
        self.position.y += dy;
    }

    /// Moves the camera back onto its origin.
    pub fn reset_position(&mut self) {
        self.position = self.origin;
    }

    // ── origin ─────────────────────────────────────────────────────────────

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.origin = Vec2::new(x, y);
    }

    pub fn reset_origin(&mut self) {
        self.origin = Vec2::ZERO;
    }

    // ── rotation ───────────────────────────────────────────────────────────

    /// Rotation in degrees.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.rotation += degrees;
    }

    pub fn reset_rotation(&mut self) {
        self.rotation = 0.0;
    }

    // ── zoom ───────────────────────────────────────────────────────────────

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom factor. Values below [`MIN_ZOOM`] (including NaN) clamp to it.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Adds `delta` to the zoom factor, clamped like [`set_zoom`](Self::set_zoom).
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = clamp_zoom(self.zoom + delta);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    // ── matrix ─────────────────────────────────────────────────────────────

    /// `T(position) · S(zoom) · Rz(rotation) · T(origin)`, cached.
    pub fn view_matrix(&mut self) -> Mat4 {
        let current = Snapshot {
            position: self.position,
            origin: self.origin,
            zoom: self.zoom,
            rotation: self.rotation,
        };
        if self.built_from != Some(current) {
            self.view = Mat4::from_translation(self.position.extend(0.0))
                * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
                * Mat4::from_rotation_z(self.rotation.to_radians())
                * Mat4::from_translation(self.origin.extend(0.0));
            self.built_from = Some(current);
            self.rebuilds += 1;
        }
        self.view
    }

    /// How many times the view matrix has been rebuilt.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    // `f32::max` returns the non-NaN operand.
    zoom.max(MIN_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn zoom_clamps_to_floor() {
        let mut cam = Camera::new();
        cam.set_zoom(1.0);
        cam.zoom_by(-5.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);

        cam.set_zoom(0.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);

        cam.set_zoom(f32::NAN);
        assert_eq!(cam.zoom(), MIN_ZOOM);

        cam.reset_zoom();
        assert_eq!(cam.zoom(), 1.0);
    }

    // ── matrix cache ──────────────────────────────────────────────────────

    #[test]
    fn view_matrix_is_cached_until_inputs_change() {
        let mut cam = Camera::new();
        cam.set_position(10.0, 20.0);

        let a = cam.view_matrix();
        let b = cam.view_matrix();
        assert_eq!(a, b);
        assert_eq!(cam.rebuild_count(), 1);

        cam.rotate(15.0);
        let c = cam.view_matrix();
        assert_ne!(a, c);
        assert_eq!(cam.rebuild_count(), 2);

        // Setting the same value again does not invalidate the cache.
        cam.set_rotation(15.0);
        cam.view_matrix();
        assert_eq!(cam.rebuild_count(), 2);
    }

    #[test]
    fn view_matrix_composition() {
        let mut cam = Camera::new();
        cam.set_position(100.0, 50.0);
        cam.set_zoom(2.0);
        cam.set_origin(5.0, 0.0);

        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        // (0 + origin) * zoom + position
        assert!((p.x - 110.0).abs() < 1e-4, "{p:?}");
        assert!((p.y - 50.0).abs() < 1e-4, "{p:?}");
    }

    #[test]
    fn identity_by_default() {
        let mut cam = Camera::new();
        assert_eq!(cam.view_matrix(), Mat4::IDENTITY);
    }

    // ── position ──────────────────────────────────────────────────────────

    #[test]
    fn translate_and_reset() {
        let mut cam = Camera::new();
        cam.set_origin(3.0, 4.0);
        cam.translate(1.0, 1.0);
        cam.translate_x(2.0);
        cam.translate_y(-1.0);
        assert_eq!(cam.position(), Vec2::new(3.0, 0.0));

        cam.reset_position();
        assert_eq!(cam.position(), Vec2::new(3.0, 4.0));

        cam.reset_origin();
        assert_eq!(cam.origin(), Vec2::ZERO);
    }
}
