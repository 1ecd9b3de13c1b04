use glam::Vec2;

use crate::coords::UvRect;
use crate::device::{ProgramKind, SharedDevice, Topology};
use crate::paint::Color;

use super::batch::{quad_model, to_clip, VertexBatch, DEFAULT_CAPACITY, QUAD_TRIANGLES, UNIT_CORNERS};
use super::camera::SharedCamera;
use super::font::{Font, LayoutItem};
use super::texture::{Texture, TextureSource};
use super::BatchError;

/// Per-draw transform and tint for sprites and text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawOptions {
    /// Degrees, about the quad center.
    pub rotation: f32,
    pub scale: f32,
    /// Multiplied with the sampled texel.
    pub color: Color,
    /// `false` draws in screen space, ignoring the camera.
    pub use_camera: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale: 1.0,
            color: Color::WHITE,
            use_camera: true,
        }
    }
}

impl DrawOptions {
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn tinted(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Screen-space drawing for overlays.
    pub fn hud(mut self) -> Self {
        self.use_camera = false;
        self
    }
}

/// Batches textured quads and bitmap text.
///
/// Consecutive draws from one texture share a single draw call; switching
/// to a different texture flushes the pending run first.
pub struct SpriteBatch {
    engine: VertexBatch,
    /// Texture of the pending run. Held so it outlives the vertices using it.
    bound: Option<Texture>,
}

impl SpriteBatch {
    pub fn new(device: SharedDevice) -> Self {
        Self::with_capacity(device, DEFAULT_CAPACITY)
    }

    /// `capacity` is the vertex buffer size in floats; see
    /// [`ShapeBatch::with_capacity`](super::ShapeBatch::with_capacity).
    pub fn with_capacity(device: SharedDevice, capacity: usize) -> Self {
        Self {
            engine: VertexBatch::new(device, ProgramKind::Sprite, capacity),
            bound: None,
        }
    }

    pub fn set_camera(&mut self, camera: Option<SharedCamera>) {
        self.engine.set_camera(camera);
    }

    pub fn camera(&self) -> Option<&SharedCamera> {
        self.engine.camera()
    }

    pub fn is_recording(&self) -> bool {
        self.engine.is_recording()
    }

    pub fn render_calls(&self) -> usize {
        self.engine.render_calls()
    }

    pub fn total_render_calls(&self) -> usize {
        self.engine.total_render_calls()
    }

    pub fn begin(&mut self) -> Result<(), BatchError> {
        self.engine.begin()?;
        self.bound = None;
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;
        self.flush();
        self.engine.end(Topology::Triangles)
    }

    /// Draws `source` with its top-left corner at `(x, y)`.
    pub fn draw_texture(
        &mut self,
        source: &impl TextureSource,
        x: f32,
        y: f32,
        opts: DrawOptions,
    ) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;
        self.prepare(source.texture(), QUAD_TRIANGLES.len());
        self.push_quad(
            x,
            y,
            Vec2::new(source.width() as f32, source.height() as f32),
            source.uv(),
            opts,
        );
        Ok(())
    }

    /// Draws `text` with `font`, starting at `(x, y)` (top-left of the first
    /// line). Each glyph is rotated about its own center.
    pub fn draw_text(
        &mut self,
        font: &Font,
        text: &str,
        x: f32,
        y: f32,
        opts: DrawOptions,
    ) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;

        let origin = Vec2::new(x, y);
        font.layout(text, opts.scale, |item| {
            let LayoutItem::Glyph { glyph, offset } = item else {
                return;
            };
            self.prepare(font.texture(), QUAD_TRIANGLES.len());
            let pos = origin + offset;
            self.push_quad(
                pos.x,
                pos.y,
                Vec2::new(glyph.width as f32, glyph.height as f32),
                font.glyph_uv(glyph),
                opts,
            );
        });
        Ok(())
    }

    // ── helpers ────────────────────────────────────────────────────────────

    /// Makes `texture` the bound texture with room for `vertices` more.
    fn prepare(&mut self, texture: &Texture, vertices: usize) {
        let same = self.bound.as_ref().is_some_and(|b| b.id() == texture.id());
        if !same || !self.engine.has_room(vertices) {
            self.flush();
        }
        if self.bound.is_none() {
            self.engine.bind_texture(Some(texture.id()));
            self.bound = Some(texture.clone());
        }
    }

    /// Submits the pending run and unbinds its texture.
    fn flush(&mut self) {
        // Released only after the draw, which may hold the last reference.
        let Some(pending) = self.bound.take() else {
            return;
        };
        self.engine.flush(Topology::Triangles);
        self.engine.bind_texture(None);
        drop(pending);
    }

    fn push_quad(&mut self, x: f32, y: f32, size: Vec2, uv: UvRect, opts: DrawOptions) {
        let model = quad_model(x, y, size.x, size.y, opts.rotation, opts.scale);
        let mvp = self.engine.mvp(model, opts.use_camera);
        let uvs = [
            Vec2::new(uv.s0, uv.t0),
            Vec2::new(uv.s1, uv.t0),
            Vec2::new(uv.s1, uv.t1),
            Vec2::new(uv.s0, uv.t1),
        ];
        let c = opts.color;
        for i in QUAD_TRIANGLES {
            let p = to_clip(&mvp, UNIT_CORNERS[i]);
            self.engine
                .push(&[p.x, p.y, c.r(), c.g(), c.b(), c.a(), uvs[i].x, uvs[i].y]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, HeadlessDevice};
    use crate::graphics::camera::Camera;
    use crate::graphics::test_support::{headless, FixedRasterizer, VIEW_H, VIEW_W};
    use crate::graphics::texture::TextureRegion;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pixel(v: &[f32]) -> Vec2 {
        Vec2::new(
            (v[0] + 1.0) * 0.5 * VIEW_W as f32,
            (1.0 - v[1]) * 0.5 * VIEW_H as f32,
        )
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    fn setup() -> (Rc<RefCell<HeadlessDevice>>, SharedDevice, SpriteBatch) {
        let (device, shared) = headless();
        let batch = SpriteBatch::new(shared.clone());
        (device, shared, batch)
    }

    fn texture(shared: &SharedDevice, w: u32, h: u32) -> Texture {
        Texture::checkerboard(shared, w, h).unwrap()
    }

    // ── texture switching ─────────────────────────────────────────────────

    #[test]
    fn same_texture_draws_share_one_call() {
        let (device, shared, mut batch) = setup();
        let tex = texture(&shared, 32, 32);

        batch.begin().unwrap();
        for i in 0..10 {
            batch
                .draw_texture(&tex, i as f32 * 10.0, 0.0, DrawOptions::default())
                .unwrap();
        }
        assert!(device.borrow().draws().is_empty());
        batch.end().unwrap();

        let dev = device.borrow();
        assert_eq!(dev.draws().len(), 1);
        assert_eq!(dev.draws()[0].vertex_count(), 60);
        assert_eq!(dev.draws()[0].texture, Some(tex.id()));
        assert_eq!(dev.texture_binds(), 1);
        assert_eq!(batch.render_calls(), 1);
    }

    #[test]
    fn texture_switch_flushes_once_per_run() {
        let (device, shared, mut batch) = setup();
        let a = texture(&shared, 8, 8);
        let b = texture(&shared, 8, 8);
        let opts = DrawOptions::default();

        batch.begin().unwrap();
        batch.draw_texture(&a, 0.0, 0.0, opts).unwrap();
        batch.draw_texture(&a, 10.0, 0.0, opts).unwrap();
        batch.draw_texture(&b, 20.0, 0.0, opts).unwrap();
        batch.draw_texture(&b, 30.0, 0.0, opts).unwrap();
        batch.draw_texture(&a, 40.0, 0.0, opts).unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        let runs: Vec<_> = dev.draws().iter().map(|d| (d.texture, d.vertex_count())).collect();
        assert_eq!(
            runs,
            vec![(Some(a.id()), 12), (Some(b.id()), 12), (Some(a.id()), 6)]
        );
        assert_eq!(dev.texture_binds(), 3);
        assert_eq!(batch.render_calls(), 3);
    }

    #[test]
    fn regions_of_one_texture_batch_together() {
        let (device, shared, mut batch) = setup();
        let tex = texture(&shared, 64, 64);
        let left = TextureRegion::with_rect(&tex, 0, 0, 32, 64);
        let right = TextureRegion::with_rect(&tex, 32, 0, 32, 64);

        batch.begin().unwrap();
        batch.draw_texture(&left, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_texture(&right, 32.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_texture(&tex, 64.0, 0.0, DrawOptions::default()).unwrap();
        batch.end().unwrap();

        assert_eq!(device.borrow().draws().len(), 1);
        assert_eq!(device.borrow().texture_binds(), 1);
    }

    #[test]
    fn flush_unbinds_and_end_restores_state() {
        let (device, shared, mut batch) = setup();
        let tex = texture(&shared, 4, 4);

        batch.begin().unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        assert_eq!(dev.bound_texture(), None);
        let tail: Vec<_> = dev.commands().iter().rev().take(4).cloned().collect();
        assert_eq!(tail[0], DeviceCommand::UseProgram(None));
        assert_eq!(tail[1], DeviceCommand::SetBlending(false));
        assert_eq!(tail[2], DeviceCommand::BindTexture { unit: 0, texture: None });
    }

    #[test]
    fn texture_dropped_mid_run_is_drawn_before_release() {
        let (device, shared, mut batch) = setup();
        let tex = texture(&shared, 4, 4);
        let id = tex.id();

        batch.begin().unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        drop(tex);
        batch.end().unwrap();

        let dev = device.borrow();
        assert_eq!(dev.draws().len(), 1);
        assert_eq!(dev.draws()[0].texture, Some(id));

        let commands = dev.commands();
        let drawn = commands.iter().position(|c| matches!(c, DeviceCommand::Draw { .. }));
        let released = commands.iter().position(|c| *c == DeviceCommand::DestroyTexture(id));
        assert!(drawn.is_some() && released.is_some());
        assert!(drawn < released);
        assert_eq!(dev.live_textures(), 0);
    }

    #[test]
    fn full_buffer_rebinds_for_the_next_run() {
        let (device, shared) = headless();
        let mut batch = SpriteBatch::with_capacity(shared.clone(), 8 * 6);
        let tex = texture(&shared, 4, 4);

        batch.begin().unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.end().unwrap();

        assert_eq!(device.borrow().draws().len(), 2);
        assert_eq!(batch.render_calls(), 2);
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn quad_uvs_follow_corners() {
        let (device, shared, mut batch) = setup();
        let tex = texture(&shared, 64, 64);
        let region = TextureRegion::with_rect(&tex, 16, 16, 32, 32);

        batch.begin().unwrap();
        batch
            .draw_texture(&region, 100.0, 50.0, DrawOptions::default().tinted(Color::RED))
            .unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        let draw = &dev.draws()[0];
        let tl = draw.vertex(0);
        let br = draw.vertex(2);
        assert!(close(pixel(tl), Vec2::new(100.0, 50.0)));
        assert!(close(pixel(br), Vec2::new(132.0, 82.0)));
        assert_eq!(&tl[6..8], &[0.25, 0.25]);
        assert_eq!(&br[6..8], &[0.75, 0.75]);
        assert_eq!(&tl[2..6], &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn hud_draws_ignore_the_camera() {
        let (device, shared, mut batch) = setup();
        let camera = Camera::new().shared();
        camera.borrow_mut().set_position(50.0, 50.0);
        batch.set_camera(Some(camera));
        let tex = texture(&shared, 8, 8);

        batch.begin().unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default().hud()).unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        let draw = &dev.draws()[0];
        assert!(close(pixel(draw.vertex(0)), Vec2::new(50.0, 50.0)));
        assert!(close(pixel(draw.vertex(6)), Vec2::ZERO));
    }

    #[test]
    fn draw_outside_begin_is_an_error() {
        let (_, shared, mut batch) = setup();
        let tex = texture(&shared, 8, 8);
        assert_eq!(
            batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()),
            Err(BatchError::NotRecording)
        );
        assert_eq!(batch.end(), Err(BatchError::NotRecording));
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn text_lays_out_lines_downward() {
        let (device, shared, mut batch) = setup();
        let font = Font::build(&shared, &FixedRasterizer::default()).unwrap();

        batch.begin().unwrap();
        batch
            .draw_text(&font, "AB\r\nC\u{2603}", 10.0, 20.0, DrawOptions::default())
            .unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        assert_eq!(dev.draws().len(), 1);
        let draw = &dev.draws()[0];
        assert_eq!(draw.texture, Some(font.texture().id()));
        // A, B and C; '\r' and the snowman are skipped.
        assert_eq!(draw.vertex_count(), 18);
        assert!(close(pixel(draw.vertex(0)), Vec2::new(10.0, 20.0)));
        assert!(close(pixel(draw.vertex(6)), Vec2::new(18.0, 20.0)));
        assert!(close(pixel(draw.vertex(12)), Vec2::new(10.0, 36.0)));
    }

    #[test]
    fn short_glyphs_sit_on_the_line_bottom() {
        let (device, shared, mut batch) = setup();
        let font = Font::build(&shared, &FixedRasterizer::default()).unwrap();

        batch.begin().unwrap();
        batch.draw_text(&font, "a", 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        let draw = &dev.draws()[0];
        assert!(close(pixel(draw.vertex(0)), Vec2::new(0.0, 4.0)));
        assert!(close(pixel(draw.vertex(2)), Vec2::new(8.0, 16.0)));
    }

    #[test]
    fn drawn_text_extent_matches_measure() {
        let (device, shared, mut batch) = setup();
        let font = Font::build(&shared, &FixedRasterizer::default()).unwrap();
        let text = "AB\na\n\nabc";

        batch.begin().unwrap();
        batch.draw_text(&font, text, 0.0, 0.0, DrawOptions::default().scaled(2.0)).unwrap();
        batch.end().unwrap();

        let dev = device.borrow();
        let draw = &dev.draws()[0];
        let extent = (0..draw.vertex_count())
            .map(|i| pixel(draw.vertex(i)))
            .fold(Vec2::ZERO, Vec2::max);
        assert!(close(extent, font.measure(text, 2.0)), "{extent:?}");
    }

    #[test]
    fn text_and_sprites_switch_textures() {
        let (device, shared, mut batch) = setup();
        let font = Font::build(&shared, &FixedRasterizer::default()).unwrap();
        let tex = texture(&shared, 8, 8);

        batch.begin().unwrap();
        batch.draw_texture(&tex, 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_text(&font, "hi", 0.0, 0.0, DrawOptions::default()).unwrap();
        batch.draw_text(&font, "there", 0.0, 20.0, DrawOptions::default()).unwrap();
        batch.end().unwrap();

        assert_eq!(device.borrow().draws().len(), 2);
    }
}
