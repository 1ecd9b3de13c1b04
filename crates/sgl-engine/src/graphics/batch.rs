use glam::{Mat4, Vec2, Vec3};

use crate::device::{BufferId, ProgramId, ProgramKind, SharedDevice, TextureId, Topology};

use super::camera::SharedCamera;
use super::BatchError;

/// Default vertex buffer size in floats.
pub const DEFAULT_CAPACITY: usize = 65_536;

/// Largest vertex footprint of a single draw call (an outlined rectangle).
pub(crate) const MAX_PRIMITIVE_VERTICES: usize = 8;

/// Shared machinery of the shape and sprite batches.
///
/// Owns the CPU vertex buffer, the device buffer/program pair and the
/// begin/end protocol. Vertices are pushed already in clip space; `flush`
/// uploads them and issues one draw call.
pub(crate) struct VertexBatch {
    device: SharedDevice,
    kind: ProgramKind,
    buffer: Option<BufferId>,
    program: Option<ProgramId>,

    vertices: Vec<f32>,
    capacity: usize,

    recording: bool,
    multisampled: bool,
    projection: Mat4,
    view: Mat4,
    camera: Option<SharedCamera>,

    calls: usize,
    total_calls: usize,
}

impl VertexBatch {
    pub(crate) fn new(device: SharedDevice, kind: ProgramKind, capacity: usize) -> Self {
        let stride = kind.layout().stride();
        // Whole vertices, and never less than one primitive.
        let capacity = (capacity / stride).max(MAX_PRIMITIVE_VERTICES) * stride;

        let (buffer, program) = {
            let mut dev = device.borrow_mut();
            let buffer = dev
                .create_vertex_buffer(kind.layout(), capacity)
                .inspect_err(|e| log::error!("{kind:?} batch: vertex buffer creation failed: {e}"))
                .ok();
            let program = dev
                .create_program(kind)
                .inspect_err(|e| log::error!("{kind:?} batch: program creation failed: {e}"))
                .ok();
            (buffer, program)
        };

        Self {
            device,
            kind,
            buffer,
            program,
            vertices: Vec::with_capacity(capacity),
            capacity,
            recording: false,
            multisampled: false,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            camera: None,
            calls: 0,
            total_calls: 0,
        }
    }

    pub(crate) fn set_camera(&mut self, camera: Option<SharedCamera>) {
        self.camera = camera;
    }

    pub(crate) fn camera(&self) -> Option<&SharedCamera> {
        self.camera.as_ref()
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording
    }

    pub(crate) fn begin(&mut self) -> Result<(), BatchError> {
        if self.recording {
            log::error!("{:?} batch: begin called while already recording", self.kind);
            return Err(BatchError::AlreadyRecording);
        }

        let mut dev = self.device.borrow_mut();
        self.projection = dev.viewport().projection();
        self.view = self
            .camera
            .as_ref()
            .map_or(Mat4::IDENTITY, |c| c.borrow_mut().view_matrix());

        dev.use_program(self.program);
        dev.set_blending(true);
        self.multisampled = dev.antialias_mode().is_multisampled();
        if self.multisampled {
            dev.set_multisampling(true);
        }
        drop(dev);

        self.vertices.clear();
        self.calls = 0;
        self.recording = true;
        Ok(())
    }

    /// Flushes pending vertices with `topology` and restores device state.
    pub(crate) fn end(&mut self, topology: Topology) -> Result<(), BatchError> {
        self.ensure_recording()?;
        self.flush(topology);

        let mut dev = self.device.borrow_mut();
        dev.set_blending(false);
        if self.multisampled {
            dev.set_multisampling(false);
        }
        dev.use_program(None);
        self.recording = false;
        Ok(())
    }

    pub(crate) fn ensure_recording(&self) -> Result<(), BatchError> {
        if self.recording {
            Ok(())
        } else {
            log::error!("{:?} batch: draw or end called outside begin/end", self.kind);
            Err(BatchError::NotRecording)
        }
    }

    /// Whether `vertex_count` more vertices fit without a flush.
    pub(crate) fn has_room(&self, vertex_count: usize) -> bool {
        self.vertices.len() + vertex_count * self.kind.layout().stride() <= self.capacity
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub(crate) fn push(&mut self, vertex: &[f32]) {
        debug_assert_eq!(vertex.len(), self.kind.layout().stride());
        debug_assert!(self.has_room(1), "push without a capacity check");
        self.vertices.extend_from_slice(vertex);
    }

    pub(crate) fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.device.borrow_mut().bind_texture(0, texture);
    }

    /// Uploads pending vertices and issues one draw call.
    pub(crate) fn flush(&mut self, topology: Topology) {
        if self.is_empty() {
            return;
        }
        let count = self.vertices.len() / self.kind.layout().stride();

        match self.buffer.filter(|_| self.program.is_some()) {
            Some(buffer) => {
                let mut dev = self.device.borrow_mut();
                match dev.upload_vertices(buffer, &self.vertices) {
                    Ok(()) => {
                        dev.draw(buffer, topology, 0, count);
                        self.calls += 1;
                        self.total_calls += 1;
                        log::trace!("{:?} batch: flushed {count} vertices as {topology:?}", self.kind);
                    }
                    Err(e) => log::error!("{:?} batch: vertex upload failed: {e}", self.kind),
                }
            }
            None => log::trace!("{:?} batch: no device resources; dropped {count} vertices", self.kind),
        }
        self.vertices.clear();
    }

    /// `projection · view · model`, with identity for the view when
    /// `use_camera` is false.
    pub(crate) fn mvp(&self, model: Mat4, use_camera: bool) -> Mat4 {
        if use_camera {
            self.projection * self.view * model
        } else {
            self.projection * model
        }
    }

    pub(crate) fn render_calls(&self) -> usize {
        self.calls
    }

    pub(crate) fn total_render_calls(&self) -> usize {
        self.total_calls
    }
}

impl Drop for VertexBatch {
    fn drop(&mut self) {
        let Ok(mut dev) = self.device.try_borrow_mut() else {
            log::error!("{:?} batch: device busy on drop; resources leak", self.kind);
            return;
        };
        if let Some(buffer) = self.buffer.take() {
            dev.destroy_vertex_buffer(buffer);
        }
        if let Some(program) = self.program.take() {
            dev.destroy_program(program);
        }
    }
}

/// Model matrix of a `w × h` quad at `(x, y)`, rotated `degrees` about its
/// center and scaled by `scale`. Maps the unit square onto the quad.
pub(crate) fn quad_model(x: f32, y: f32, w: f32, h: f32, degrees: f32, scale: f32) -> Mat4 {
    let half = Vec3::new(0.5 * w, 0.5 * h, 0.0);
    Mat4::from_translation(Vec3::new(x, y, 0.0))
        * Mat4::from_translation(half)
        * Mat4::from_rotation_z(degrees.to_radians())
        * Mat4::from_translation(-half)
        * Mat4::from_scale(Vec3::new(scale * w, scale * h, 1.0))
}

/// Unit-square corners in emission order: top-left, top-right,
/// bottom-right, bottom-left.
pub(crate) const UNIT_CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Corner indices of the two triangles of a quad.
pub(crate) const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 2, 3, 0];

#[inline]
pub(crate) fn to_clip(mvp: &Mat4, p: Vec2) -> Vec2 {
    mvp.transform_point3(p.extend(0.0)).truncate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AntialiasMode;
    use crate::coords::Viewport;
    use crate::device::{DeviceCommand, HeadlessDevice};
    use crate::graphics::test_support::{headless, wrap};

    fn colored(batch: &mut VertexBatch, n: usize) {
        for _ in 0..n {
            batch.push(&[0.0; 6]);
        }
    }

    // ── protocol ──────────────────────────────────────────────────────────

    #[test]
    fn double_begin_is_rejected_without_side_effects() {
        let (device, shared) = headless();
        let mut batch = VertexBatch::new(shared, ProgramKind::Shape, 60);
        batch.begin().unwrap();
        colored(&mut batch, 3);
        let commands_before = device.borrow().commands().len();

        assert_eq!(batch.begin(), Err(BatchError::AlreadyRecording));
        assert!(batch.is_recording());
        assert!(!batch.is_empty());
        assert_eq!(device.borrow().commands().len(), commands_before);
    }

    #[test]
    fn end_without_begin_is_rejected() {
        let (device, shared) = headless();
        let mut batch = VertexBatch::new(shared, ProgramKind::Shape, 60);
        let before = device.borrow().commands().len();
        assert_eq!(batch.end(Topology::Triangles), Err(BatchError::NotRecording));
        assert_eq!(device.borrow().commands().len(), before);
    }

    #[test]
    fn begin_and_end_toggle_device_state() {
        let (device, shared) =
            wrap(HeadlessDevice::new(Viewport::new(100, 100)).with_antialias(AntialiasMode::Msaa4x));
        let mut batch = VertexBatch::new(shared, ProgramKind::Shape, 60);

        batch.begin().unwrap();
        assert!(device.borrow().blending());
        assert!(device.borrow().multisampling());

        batch.end(Topology::Triangles).unwrap();
        assert!(!device.borrow().blending());
        assert!(!device.borrow().multisampling());
        assert_eq!(
            device.borrow().commands().last(),
            Some(&DeviceCommand::UseProgram(None))
        );
    }

    // ── flushing ──────────────────────────────────────────────────────────

    #[test]
    fn flush_issues_one_draw_and_counts_it() {
        let (device, shared) = headless();
        let mut batch = VertexBatch::new(shared, ProgramKind::Shape, 600);
        batch.begin().unwrap();
        colored(&mut batch, 6);
        batch.flush(Topology::Triangles);
        batch.flush(Topology::Triangles);
        batch.end(Topology::Triangles).unwrap();

        assert_eq!(device.borrow().draws().len(), 1);
        assert_eq!(device.borrow().draws()[0].vertex_count(), 6);
        assert_eq!(batch.render_calls(), 1);

        batch.begin().unwrap();
        assert_eq!(batch.render_calls(), 0);
        assert_eq!(batch.total_render_calls(), 1);
    }

    #[test]
    fn capacity_is_whole_vertices() {
        let (_, shared) = headless();
        let batch = VertexBatch::new(shared, ProgramKind::Sprite, 8 * 10 + 3);
        assert!(batch.has_room(10));
        assert!(!batch.has_room(11));
    }

    #[test]
    fn capacity_never_drops_below_one_primitive() {
        let (_, shared) = headless();
        let batch = VertexBatch::new(shared, ProgramKind::Shape, 6);
        assert!(batch.has_room(MAX_PRIMITIVE_VERTICES));
        assert!(!batch.has_room(MAX_PRIMITIVE_VERTICES + 1));
    }

    #[test]
    fn missing_program_skips_submission() {
        let (device, shared) = wrap(HeadlessDevice::new(Viewport::new(10, 10)).failing_programs());
        let mut batch = VertexBatch::new(shared, ProgramKind::Shape, 60);
        batch.begin().unwrap();
        colored(&mut batch, 3);
        batch.end(Topology::Triangles).unwrap();

        assert!(device.borrow().draws().is_empty());
        assert_eq!(batch.total_render_calls(), 0);
    }

    #[test]
    fn drop_releases_device_resources() {
        let (device, shared) = headless();
        let batch = VertexBatch::new(shared, ProgramKind::Sprite, 64);
        assert_eq!(device.borrow().live_buffers(), 1);
        drop(batch);
        assert_eq!(device.borrow().live_buffers(), 0);
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn unrotated_unit_scale_quad_maps_to_its_pixel_rect() {
        let m = quad_model(10.0, 20.0, 30.0, 40.0, 0.0, 1.0);
        let br = m.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((br.x - 40.0).abs() < 1e-4 && (br.y - 60.0).abs() < 1e-4, "{br:?}");
    }

    #[test]
    fn rotation_is_about_the_center() {
        let m = quad_model(0.0, 0.0, 10.0, 10.0, 180.0, 1.0);
        let tl = m.transform_point3(Vec3::ZERO);
        assert!((tl.x - 10.0).abs() < 1e-4 && (tl.y - 10.0).abs() < 1e-4, "{tl:?}");
    }
}
