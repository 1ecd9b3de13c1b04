use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;
    if !prefer_srgb {
        return Some(first);
    }
    [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ]
    .into_iter()
    .find(|f| caps.formats.contains(f))
    .or(Some(first))
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }
    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            log::debug!("surface {err:?}; reconfigured");
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}
