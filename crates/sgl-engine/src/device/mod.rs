//! Graphics device layer.
//!
//! - [`GraphicsDevice`]: the low-level operations batches are written against
//! - [`HeadlessDevice`]: a recording implementation with no GPU
//! - [`WgpuDevice`]: the wgpu implementation, replayed once per frame
//! - [`Gpu`]: instance/adapter/device/queue and surface ownership

mod api;
mod error;
mod gpu;
mod headless;
mod surface;
mod wgpu_device;

pub use api::{
    BufferId, GraphicsDevice, ProgramId, ProgramKind, SharedDevice, TextureId, Topology,
    VertexLayout, ViewportProvider,
};
pub use error::{DeviceError, SurfaceErrorAction};
pub use gpu::{Gpu, GpuFrame, GpuInit};
pub use headless::{DeviceCommand, DrawRecord, HeadlessDevice};
pub use wgpu_device::WgpuDevice;
