use std::collections::HashMap;

use crate::config::AntialiasMode;
use crate::coords::Viewport;

use super::{
    BufferId, DeviceError, GraphicsDevice, ProgramId, ProgramKind, TextureId, Topology,
    VertexLayout, ViewportProvider,
};

/// One call made against a [`HeadlessDevice`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateVertexBuffer(BufferId),
    DestroyVertexBuffer(BufferId),
    UploadVertices { buffer: BufferId, floats: usize },
    CreateTexture { texture: TextureId, width: u32, height: u32 },
    DestroyTexture(TextureId),
    BindTexture { unit: u32, texture: Option<TextureId> },
    CreateProgram(ProgramId, ProgramKind),
    DestroyProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetBlending(bool),
    SetMultisampling(bool),
    Draw { buffer: BufferId, topology: Topology, first: usize, count: usize },
}

/// A submitted draw with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub topology: Topology,
    pub program: Option<ProgramKind>,
    pub texture: Option<TextureId>,
    pub layout: VertexLayout,
    /// Interleaved vertex data of the drawn range.
    pub vertices: Vec<f32>,
}

impl DrawRecord {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }

    /// The `index`-th vertex as a slice of `layout.stride()` floats.
    pub fn vertex(&self, index: usize) -> &[f32] {
        let stride = self.layout.stride();
        &self.vertices[index * stride..(index + 1) * stride]
    }
}

struct Buffer {
    layout: VertexLayout,
    capacity: usize,
    data: Vec<f32>,
}

/// A device with no GPU behind it.
///
/// Every call is appended to [`commands`](Self::commands) and every draw to
/// [`draws`](Self::draws), which makes batch behavior observable in tests
/// and offline tooling.
pub struct HeadlessDevice {
    viewport: Viewport,
    antialias: AntialiasMode,
    fail_programs: bool,

    next_id: u32,
    buffers: HashMap<BufferId, Buffer>,
    textures: HashMap<TextureId, (u32, u32)>,
    programs: HashMap<ProgramId, ProgramKind>,

    bound_texture: Option<TextureId>,
    program: Option<ProgramId>,
    blending: bool,
    multisampling: bool,

    commands: Vec<DeviceCommand>,
    draws: Vec<DrawRecord>,
}

impl HeadlessDevice {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            antialias: AntialiasMode::Disabled,
            fail_programs: false,
            next_id: 1,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            bound_texture: None,
            program: None,
            blending: false,
            multisampling: false,
            commands: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn with_antialias(mut self, mode: AntialiasMode) -> Self {
        self.antialias = mode;
        self
    }

    /// Makes every later `create_program` call fail.
    pub fn failing_programs(mut self) -> Self {
        self.fail_programs = true;
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn blending(&self) -> bool {
        self.blending
    }

    pub fn multisampling(&self) -> bool {
        self.multisampling
    }

    pub fn bound_texture(&self) -> Option<TextureId> {
        self.bound_texture
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of `BindTexture` commands that bound (not unbound) a texture.
    pub fn texture_binds(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::BindTexture { texture: Some(_), .. }))
            .count()
    }

    /// Drops recorded commands and draws, keeping resources alive.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl ViewportProvider for HeadlessDevice {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn antialias_mode(&self) -> AntialiasMode {
        self.antialias
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_vertex_buffer(
        &mut self,
        layout: VertexLayout,
        capacity_floats: usize,
    ) -> Result<BufferId, DeviceError> {
        let id = BufferId(self.next_id());
        self.buffers.insert(
            id,
            Buffer {
                layout,
                capacity: capacity_floats,
                data: Vec::new(),
            },
        );
        self.commands.push(DeviceCommand::CreateVertexBuffer(id));
        Ok(id)
    }

    fn destroy_vertex_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.commands.push(DeviceCommand::DestroyVertexBuffer(buffer));
    }

    fn upload_vertices(&mut self, buffer: BufferId, data: &[f32]) -> Result<(), DeviceError> {
        let buf = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DeviceError::UnknownHandle("vertex buffer"))?;
        if data.len() > buf.capacity {
            return Err(DeviceError::BufferOverflow {
                len: data.len(),
                capacity: buf.capacity,
            });
        }
        buf.data.clear();
        buf.data.extend_from_slice(data);
        self.commands.push(DeviceCommand::UploadVertices {
            buffer,
            floats: data.len(),
        });
        Ok(())
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, DeviceError> {
        if width == 0 || height == 0 {
            return Err(DeviceError::InvalidTextureSize { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DeviceError::TextureDataLength {
                expected,
                actual: rgba.len(),
            });
        }
        let texture = TextureId(self.next_id());
        self.textures.insert(texture, (width, height));
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            width,
            height,
        });
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
        self.commands.push(DeviceCommand::DestroyTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        if unit == 0 {
            self.bound_texture = texture;
        }
        self.commands.push(DeviceCommand::BindTexture { unit, texture });
    }

    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, DeviceError> {
        if self.fail_programs {
            return Err(DeviceError::ProgramCreation(format!(
                "{kind:?} program rejected by headless device"
            )));
        }
        let id = ProgramId(self.next_id());
        self.programs.insert(id, kind);
        self.commands.push(DeviceCommand::CreateProgram(id, kind));
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.program == Some(program) {
            self.program = None;
        }
        self.commands.push(DeviceCommand::DestroyProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.program = program;
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
        self.commands.push(DeviceCommand::SetBlending(enabled));
    }

    fn set_multisampling(&mut self, enabled: bool) {
        self.multisampling = enabled;
        self.commands.push(DeviceCommand::SetMultisampling(enabled));
    }

    fn draw(&mut self, buffer: BufferId, topology: Topology, first: usize, count: usize) {
        self.commands.push(DeviceCommand::Draw {
            buffer,
            topology,
            first,
            count,
        });

        let Some(buf) = self.buffers.get(&buffer) else {
            log::warn!("draw against unknown buffer {buffer:?}");
            return;
        };
        let stride = buf.layout.stride();
        let start = (first * stride).min(buf.data.len());
        let end = ((first + count) * stride).min(buf.data.len());

        self.draws.push(DrawRecord {
            topology,
            program: self.program.and_then(|p| self.programs.get(&p).copied()),
            texture: self.bound_texture,
            layout: buf.layout,
            vertices: buf.data[start..end].to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> HeadlessDevice {
        HeadlessDevice::new(Viewport::new(64, 64))
    }

    #[test]
    fn draw_records_bound_state_and_vertex_range() {
        let mut d = device();
        let buf = d.create_vertex_buffer(VertexLayout::Colored, 64).unwrap();
        let tex = d.create_texture(1, 1, &[255; 4]).unwrap();
        let prog = d.create_program(ProgramKind::Shape).unwrap();

        let data: Vec<f32> = (0..18).map(|i| i as f32).collect();
        d.upload_vertices(buf, &data).unwrap();
        d.use_program(Some(prog));
        d.bind_texture(0, Some(tex));
        d.draw(buf, Topology::Triangles, 1, 2);

        let draw = &d.draws()[0];
        assert_eq!(draw.program, Some(ProgramKind::Shape));
        assert_eq!(draw.texture, Some(tex));
        assert_eq!(draw.vertex_count(), 2);
        assert_eq!(draw.vertex(0)[0], 6.0);
    }

    #[test]
    fn texture_validation() {
        let mut d = device();
        assert!(matches!(
            d.create_texture(0, 4, &[]),
            Err(DeviceError::InvalidTextureSize { .. })
        ));
        assert!(matches!(
            d.create_texture(2, 2, &[0; 3]),
            Err(DeviceError::TextureDataLength { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn upload_over_capacity_is_rejected() {
        let mut d = device();
        let buf = d.create_vertex_buffer(VertexLayout::Textured, 8).unwrap();
        assert!(d.upload_vertices(buf, &[0.0; 16]).is_err());
    }

    #[test]
    fn failing_programs() {
        let mut d = device().failing_programs();
        assert!(d.create_program(ProgramKind::Sprite).is_err());
    }

    #[test]
    fn destroying_bound_texture_unbinds_it() {
        let mut d = device();
        let tex = d.create_texture(1, 1, &[0; 4]).unwrap();
        d.bind_texture(0, Some(tex));
        d.destroy_texture(tex);
        assert_eq!(d.bound_texture(), None);
        assert_eq!(d.live_textures(), 0);
    }
}
