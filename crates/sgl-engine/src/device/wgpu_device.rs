use std::collections::HashMap;

use crate::config::{AntialiasMode, GraphicsConfig, TextureFilterMode};
use crate::coords::Viewport;
use crate::paint::Color;

use super::{
    BufferId, DeviceError, GraphicsDevice, ProgramId, ProgramKind, TextureId, Topology,
    VertexLayout, ViewportProvider,
};

// ── staging types ─────────────────────────────────────────────────────────

/// CPU copy of a batch's vertex buffer. Draws copy ranges out of it into the
/// per-frame arena, so a batch may overwrite it right after `draw`.
struct StagingBuffer {
    layout: VertexLayout,
    capacity: usize,
    data: Vec<f32>,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    kind: ProgramKind,
    topology: Topology,
    blend: bool,
}

struct StagedDraw {
    key: PipelineKey,
    texture: Option<TextureId>,
    first: u32,
    count: u32,
}

/// Growable GPU vertex buffer holding one frame of one vertex layout.
#[derive(Default)]
struct Arena {
    data: Vec<f32>,
    buffer: Option<wgpu::Buffer>,
    capacity_bytes: u64,
}

impl Arena {
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, label: &str) {
        if self.data.is_empty() {
            return;
        }
        let required = (self.data.len() * std::mem::size_of::<f32>()) as u64;
        if self.buffer.is_none() || required > self.capacity_bytes {
            let size = required.next_power_of_two().max(4096);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity_bytes = size;
        }
        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.data));
        }
    }
}

// ── device ────────────────────────────────────────────────────────────────

/// [`GraphicsDevice`] backed by wgpu.
///
/// Batches talk to it as if it were an immediate-mode API. Internally each
/// `draw` is staged into a per-frame arena and the whole frame is replayed
/// by [`render`](Self::render) in a single render pass, in submission order.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    viewport: Viewport,
    antialias: AntialiasMode,
    sample_count: u32,

    shape_shader: wgpu::ShaderModule,
    sprite_shader: wgpu::ShaderModule,
    texture_bgl: wgpu::BindGroupLayout,
    shape_layout: wgpu::PipelineLayout,
    sprite_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    next_id: u32,
    buffers: HashMap<BufferId, StagingBuffer>,
    textures: HashMap<TextureId, GpuTexture>,
    programs: HashMap<ProgramId, ProgramKind>,

    bound_texture: Option<TextureId>,
    program: Option<ProgramId>,
    blending: bool,
    multisampling: bool,

    colored: Arena,
    textured: Arena,
    draws: Vec<StagedDraw>,
    /// Destroyed while staged draws still sampled them; freed after replay.
    retired: Vec<TextureId>,

    msaa: Option<(wgpu::TextureView, Viewport)>,
}

impl WgpuDevice {
    /// Creates the device on top of an existing wgpu device/queue pair.
    ///
    /// `sample_count` must already be validated against the surface format.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        config: &GraphicsConfig,
        sample_count: u32,
    ) -> Self {
        let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sgl shape shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shape.wgsl").into()),
        });
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sgl sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sgl texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shape_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sgl shape pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });
        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sgl sprite pipeline layout"),
            bind_group_layouts: &[&texture_bgl],
            immediate_size: 0,
        });

        let sampler = create_sampler(&device, config.texture_filter);

        log::info!(
            "wgpu device ready: format={surface_format:?}, antialias={}, samples={sample_count}, filter={}",
            config.antialias,
            config.texture_filter
        );

        Self {
            device,
            queue,
            surface_format,
            viewport,
            antialias: config.antialias,
            sample_count: sample_count.max(1),
            shape_shader,
            sprite_shader,
            texture_bgl,
            shape_layout,
            sprite_layout,
            sampler,
            pipelines: HashMap::new(),
            next_id: 1,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            bound_texture: None,
            program: None,
            blending: false,
            multisampling: false,
            colored: Arena::default(),
            textured: Arena::default(),
            draws: Vec::new(),
            retired: Vec::new(),
            msaa: None,
        }
    }

    /// Updates the drawable size after a window resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of draws staged since the last [`render`](Self::render).
    pub fn staged_draws(&self) -> usize {
        self.draws.len()
    }

    /// Replays every staged draw into `view`, clearing it to `clear` first.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear: Color,
    ) {
        self.colored.upload(&self.device, &self.queue, "sgl colored arena");
        self.textured.upload(&self.device, &self.queue, "sgl textured arena");

        let keys: Vec<PipelineKey> = self.draws.iter().map(|d| d.key).collect();
        for key in keys {
            self.ensure_pipeline(key);
        }
        self.ensure_msaa_target();

        let (attachment_view, resolve_target) = match self.msaa.as_ref() {
            Some((msaa_view, _)) => (msaa_view, Some(view)),
            None => (view, None),
        };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sgl frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &self.draws {
                let Some(pipeline) = self.pipelines.get(&draw.key) else { continue; };
                let arena = match draw.key.kind.layout() {
                    VertexLayout::Colored => &self.colored,
                    VertexLayout::Textured => &self.textured,
                };
                let Some(buffer) = arena.buffer.as_ref() else { continue; };

                rpass.set_pipeline(pipeline);
                if draw.key.kind == ProgramKind::Sprite {
                    let Some(tex) = draw.texture.and_then(|t| self.textures.get(&t)) else {
                        continue;
                    };
                    rpass.set_bind_group(0, &tex.bind_group, &[]);
                }
                rpass.set_vertex_buffer(0, buffer.slice(..));
                rpass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.colored.data.clear();
        self.textured.data.clear();
        self.draws.clear();
        for texture in self.retired.drain(..) {
            self.textures.remove(&texture);
        }
    }

    fn ensure_msaa_target(&mut self) {
        if self.sample_count <= 1 {
            self.msaa = None;
            return;
        }
        if matches!(&self.msaa, Some((_, vp)) if *vp == self.viewport) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sgl msaa target"),
            size: wgpu::Extent3d {
                width: self.viewport.width.max(1),
                height: self.viewport.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.msaa = Some((view, self.viewport));
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let (shader, layout, label) = match key.kind {
            ProgramKind::Shape => (&self.shape_shader, &self.shape_layout, "sgl shape pipeline"),
            ProgramKind::Sprite => (&self.sprite_shader, &self.sprite_layout, "sgl sprite pipeline"),
        };

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_buffer_layout(key.kind.layout())],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: key.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(key.topology),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created pipeline {key:?}");
        self.pipelines.insert(key, pipeline);
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl ViewportProvider for WgpuDevice {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn antialias_mode(&self) -> AntialiasMode {
        self.antialias
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_vertex_buffer(
        &mut self,
        layout: VertexLayout,
        capacity_floats: usize,
    ) -> Result<BufferId, DeviceError> {
        let id = BufferId(self.next_id());
        self.buffers.insert(
            id,
            StagingBuffer {
                layout,
                capacity: capacity_floats,
                data: Vec::with_capacity(capacity_floats),
            },
        );
        Ok(id)
    }

    fn destroy_vertex_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
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

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sgl texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sgl texture bind group"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = TextureId(self.next_id());
        self.textures.insert(
            id,
            GpuTexture {
                _texture: texture,
                bind_group,
            },
        );
        log::debug!("created texture {id:?} ({width}x{height})");
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.draws.iter().any(|d| d.texture == Some(texture)) {
            log::trace!("texture {texture:?} released with staged draws; freeing after render");
            self.retired.push(texture);
        } else {
            self.textures.remove(&texture);
        }
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        if unit != 0 {
            log::warn!("texture unit {unit} is not supported; only unit 0 is sampled");
            return;
        }
        self.bound_texture = texture;
    }

    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, DeviceError> {
        let id = ProgramId(self.next_id());
        self.programs.insert(id, kind);
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.program == Some(program) {
            self.program = None;
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.program = program;
    }

    fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
    }

    fn set_multisampling(&mut self, enabled: bool) {
        if enabled != self.multisampling {
            log::debug!("multisampling toggled to {enabled} (sample count fixed at {})", self.sample_count);
        }
        self.multisampling = enabled;
    }

    fn draw(&mut self, buffer: BufferId, topology: Topology, first: usize, count: usize) {
        let Some(kind) = self.program.and_then(|p| self.programs.get(&p).copied()) else {
            log::warn!("draw issued without a program in use; skipped");
            return;
        };
        let Some(buf) = self.buffers.get(&buffer) else {
            log::warn!("draw against unknown buffer {buffer:?}; skipped");
            return;
        };
        if buf.layout != kind.layout() {
            log::warn!("{kind:?} program cannot draw {:?} vertices; skipped", buf.layout);
            return;
        }
        if kind == ProgramKind::Sprite && self.bound_texture.is_none() {
            log::warn!("sprite draw without a bound texture; skipped");
            return;
        }

        let stride = buf.layout.stride();
        let start = (first * stride).min(buf.data.len());
        let end = ((first + count) * stride).min(buf.data.len());
        if start == end {
            return;
        }

        let arena = match buf.layout {
            VertexLayout::Colored => &mut self.colored,
            VertexLayout::Textured => &mut self.textured,
        };
        let arena_first = (arena.data.len() / stride) as u32;
        arena.data.extend_from_slice(&buf.data[start..end]);

        self.draws.push(StagedDraw {
            key: PipelineKey {
                kind,
                topology,
                blend: self.blending,
            },
            texture: self.bound_texture,
            first: arena_first,
            count: ((end - start) / stride) as u32,
        });
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

const COLORED_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x4  // color
];

const TEXTURED_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x4, // color
    2 => Float32x2  // uv
];

fn vertex_buffer_layout(layout: VertexLayout) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match layout {
        VertexLayout::Colored => &COLORED_ATTRS,
        VertexLayout::Textured => &TEXTURED_ATTRS,
    };
    wgpu::VertexBufferLayout {
        array_stride: (layout.stride() * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::Points => wgpu::PrimitiveTopology::PointList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

fn create_sampler(device: &wgpu::Device, filter: TextureFilterMode) -> wgpu::Sampler {
    let (mag, min, mip) = match filter {
        TextureFilterMode::Nearest => (
            wgpu::FilterMode::Nearest,
            wgpu::FilterMode::Nearest,
            wgpu::MipmapFilterMode::Nearest,
        ),
        TextureFilterMode::Bilinear => (
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Linear,
            wgpu::MipmapFilterMode::Nearest,
        ),
        _ => (
            wgpu::FilterMode::Linear,
            wgpu::FilterMode::Linear,
            wgpu::MipmapFilterMode::Linear,
        ),
    };

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sgl sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: mag,
        min_filter: min,
        mipmap_filter: mip,
        anisotropy_clamp: filter.anisotropy(),
        ..Default::default()
    })
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r() as f64,
        g: c.g() as f64,
        b: c.b() as f64,
        a: c.a() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_match_strides() {
        let colored = vertex_buffer_layout(VertexLayout::Colored);
        assert_eq!(colored.array_stride, 24);
        assert_eq!(colored.attributes.len(), 2);

        let textured = vertex_buffer_layout(VertexLayout::Textured);
        assert_eq!(textured.array_stride, 32);
        assert_eq!(textured.attributes[2].offset, 24);
    }

    #[test]
    fn topology_mapping() {
        assert_eq!(primitive_topology(Topology::Points), wgpu::PrimitiveTopology::PointList);
        assert_eq!(primitive_topology(Topology::Lines), wgpu::PrimitiveTopology::LineList);
        assert_eq!(
            primitive_topology(Topology::Triangles),
            wgpu::PrimitiveTopology::TriangleList
        );
    }
}
