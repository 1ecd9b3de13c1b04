use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AntialiasMode;
use crate::coords::Viewport;

use super::DeviceError;

/// Handle to a device-owned vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle to a device-owned RGBA8 texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub(crate) u32);

/// Handle to a linked shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Interleaved vertex formats understood by the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexLayout {
    /// `x, y, r, g, b, a`
    Colored,
    /// `x, y, r, g, b, a, s, t`
    Textured,
}

impl VertexLayout {
    /// Floats per vertex.
    pub const fn stride(self) -> usize {
        match self {
            VertexLayout::Colored => 6,
            VertexLayout::Textured => 8,
        }
    }
}

/// Primitive assembly for a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Points,
    Lines,
    Triangles,
}

/// The two shader programs a batch can request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramKind {
    /// Per-vertex color, no texture.
    Shape,
    /// Texture sample modulated by per-vertex color.
    Sprite,
}

impl ProgramKind {
    pub const fn layout(self) -> VertexLayout {
        match self {
            ProgramKind::Shape => VertexLayout::Colored,
            ProgramKind::Sprite => VertexLayout::Textured,
        }
    }
}

/// Read access to the current drawable area.
pub trait ViewportProvider {
    fn viewport(&self) -> Viewport;
    fn antialias_mode(&self) -> AntialiasMode;
}

/// Low-level graphics operations consumed by the batches.
///
/// Vertex positions arrive already transformed to clip space; the device
/// only assembles, samples and blends.
pub trait GraphicsDevice: ViewportProvider {
    fn create_vertex_buffer(
        &mut self,
        layout: VertexLayout,
        capacity_floats: usize,
    ) -> Result<BufferId, DeviceError>;
    fn destroy_vertex_buffer(&mut self, buffer: BufferId);

    /// Replaces the contents of `buffer` with `data`.
    fn upload_vertices(&mut self, buffer: BufferId, data: &[f32]) -> Result<(), DeviceError>;

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8])
        -> Result<TextureId, DeviceError>;
    fn destroy_texture(&mut self, texture: TextureId);
    /// Binds `texture` to sampler `unit`, or unbinds it with `None`.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, DeviceError>;
    fn destroy_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: Option<ProgramId>);

    fn set_blending(&mut self, enabled: bool);
    fn set_multisampling(&mut self, enabled: bool);

    /// Draws `count` vertices of `buffer` starting at vertex `first`.
    fn draw(&mut self, buffer: BufferId, topology: Topology, first: usize, count: usize);
}

/// The device handle shared by every batch and texture of a context.
pub type SharedDevice = Rc<RefCell<dyn GraphicsDevice>>;
