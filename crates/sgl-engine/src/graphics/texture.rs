use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::coords::UvRect;
use crate::device::{SharedDevice, TextureId};
use crate::paint::Color;

use super::TextureError;

/// Edge length in pixels of a checkerboard cell.
const CHECKER_CELL: u32 = 16;

struct TextureInner {
    id: TextureId,
    width: u32,
    height: u32,
    device: SharedDevice,
}

impl Drop for TextureInner {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => {
                device.destroy_texture(self.id);
                log::trace!("released texture {:?}", self.id);
            }
            Err(_) => log::error!(
                "device busy while releasing texture {:?}; the GPU texture leaks",
                self.id
            ),
        }
    }
}

/// A device texture. Cloning shares it; the device texture is released when
/// the last clone is dropped.
#[derive(Clone)]
pub struct Texture {
    inner: Rc<TextureInner>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.inner.id)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .finish()
    }
}

impl Texture {
    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba(
        device: &SharedDevice,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }
        let id = device.borrow_mut().create_texture(width, height, rgba)?;
        Ok(Self {
            inner: Rc::new(TextureInner {
                id,
                width,
                height,
                device: Rc::clone(device),
            }),
        })
    }

    pub fn from_image(device: &SharedDevice, image: &image::RgbaImage) -> Result<Self, TextureError> {
        Self::from_rgba(device, image.width(), image.height(), image.as_raw())
    }

    /// Decodes an image file (PNG, JPEG, BMP, GIF or TGA).
    pub fn from_file(device: &SharedDevice, path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        log::debug!(
            "decoded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_image(device, &image)
    }

    /// A white/coral checkerboard, used as a visible stand-in for missing art.
    pub fn checkerboard(device: &SharedDevice, width: u32, height: u32) -> Result<Self, TextureError> {
        let image = image::RgbaImage::from_fn(width, height, |x, y| {
            let c = if ((x / CHECKER_CELL) + (y / CHECKER_CELL)) % 2 == 0 {
                Color::WHITE
            } else {
                Color::CORAL
            };
            image::Rgba(c.to_rgba8888().to_be_bytes())
        });
        Self::from_image(device, &image)
    }

    /// Loads `path`, falling back to a 64×64 checkerboard when it cannot be
    /// read or decoded.
    pub fn load_or_checkerboard(
        device: &SharedDevice,
        path: impl AsRef<Path>,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        match Self::from_file(device, path) {
            Ok(texture) => Ok(texture),
            Err(err @ (TextureError::Io { .. } | TextureError::Decode(_))) => {
                log::error!("failed to load texture {}: {err}; using checkerboard", path.display());
                Self::checkerboard(device, 64, 64)
            }
            Err(err) => Err(err),
        }
    }

    pub fn id(&self) -> TextureId {
        self.inner.id
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Whether `self` and `other` share one device texture.
    pub fn same_texture(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A sub-rectangle of a [`Texture`] with its own pixel size.
#[derive(Debug, Clone)]
pub struct TextureRegion {
    texture: Texture,
    uv: UvRect,
    width: u32,
    height: u32,
}

impl TextureRegion {
    /// The whole texture.
    pub fn new(texture: &Texture) -> Self {
        Self::with_rect(texture, 0, 0, texture.width() as i32, texture.height() as i32)
    }

    /// The `w × h` region at the texture's top-left.
    pub fn with_size(texture: &Texture, w: i32, h: i32) -> Self {
        Self::with_rect(texture, 0, 0, w, h)
    }

    pub fn with_rect(texture: &Texture, x: i32, y: i32, w: i32, h: i32) -> Self {
        let mut region = Self {
            texture: texture.clone(),
            uv: UvRect::FULL,
            width: texture.width(),
            height: texture.height(),
        };
        region.set_region(x, y, w, h);
        region
    }

    /// Selects a pixel rectangle. Negative extents flip the region.
    pub fn set_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let tex_w = self.texture.width() as f32;
        let tex_h = self.texture.height() as f32;
        let mut uv = UvRect::from_pixels(x as f32, y as f32, w as f32, h as f32, tex_w, tex_h);

        self.width = w.unsigned_abs();
        self.height = h.unsigned_abs();

        // Pull single-texel regions a quarter texel inward so filtering
        // cannot bleed in neighbours.
        if self.width == 1 && self.height == 1 {
            let adj_x = 0.25 / tex_w;
            let adj_y = 0.25 / tex_h;
            uv.s0 += adj_x;
            uv.s1 -= adj_x;
            uv.t0 += adj_y;
            uv.t1 -= adj_y;
        }
        self.uv = uv;
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

/// Anything a sprite batch can draw: a texture plus the part of it to show.
pub trait TextureSource {
    fn texture(&self) -> &Texture;
    fn uv(&self) -> UvRect;
    /// Drawn width in pixels at scale 1.
    fn width(&self) -> u32;
    /// Drawn height in pixels at scale 1.
    fn height(&self) -> u32;
}

impl TextureSource for Texture {
    fn texture(&self) -> &Texture {
        self
    }

    fn uv(&self) -> UvRect {
        UvRect::FULL
    }

    fn width(&self) -> u32 {
        self.inner.width
    }

    fn height(&self) -> u32 {
        self.inner.height
    }
}

impl TextureSource for TextureRegion {
    fn texture(&self) -> &Texture {
        &self.texture
    }

    fn uv(&self) -> UvRect {
        self.uv
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::test_support::headless;

    #[test]
    fn last_clone_releases_device_texture_once() {
        let (device, shared) = headless();
        let tex = Texture::from_rgba(&shared, 2, 2, &[255; 16]).unwrap();
        let copy = tex.clone();
        assert_eq!(device.borrow().live_textures(), 1);

        drop(tex);
        assert_eq!(device.borrow().live_textures(), 1);

        drop(copy);
        assert_eq!(device.borrow().live_textures(), 0);
        let destroys = device
            .borrow()
            .commands()
            .iter()
            .filter(|c| matches!(c, crate::device::DeviceCommand::DestroyTexture(_)))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn zero_sized_texture_is_rejected() {
        let (_, shared) = headless();
        assert!(matches!(
            Texture::from_rgba(&shared, 0, 8, &[]),
            Err(TextureError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn region_uv_and_size() {
        let (_, shared) = headless();
        let tex = Texture::checkerboard(&shared, 64, 32).unwrap();
        let region = TextureRegion::with_rect(&tex, 16, 8, 32, 16);

        assert_eq!(TextureSource::width(&region), 32);
        assert_eq!(TextureSource::height(&region), 16);
        assert_eq!(region.uv(), UvRect::new(0.25, 0.25, 0.75, 0.75));
        assert!(region.texture().same_texture(&tex));
    }

    #[test]
    fn single_texel_region_is_inset() {
        let (_, shared) = headless();
        let tex = Texture::checkerboard(&shared, 4, 4).unwrap();
        let region = TextureRegion::with_rect(&tex, 1, 1, 1, 1);
        let uv = region.uv();
        assert!((uv.s0 - (0.25 + 0.0625)).abs() < 1e-6);
        assert!((uv.s1 - (0.5 - 0.0625)).abs() < 1e-6);
    }

    #[test]
    fn missing_file_falls_back_to_checkerboard() {
        let (_, shared) = headless();
        let tex = Texture::load_or_checkerboard(&shared, "does/not/exist.png").unwrap();
        assert_eq!((tex.width(), tex.height()), (64, 64));
        assert!(matches!(
            Texture::from_file(&shared, "does/not/exist.png"),
            Err(TextureError::Io { .. })
        ));
    }
}
