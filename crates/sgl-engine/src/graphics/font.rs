use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;

use crate::coords::UvRect;
use crate::device::SharedDevice;

use super::rasterizer::{FontdueRasterizer, GlyphRasterizer};
use super::texture::Texture;
use super::FontError;

/// Characters baked into every atlas: printable ASCII.
const ATLAS_CHARS: std::ops::RangeInclusive<char> = ' '..='~';

/// Monospace faces tried in order by [`Font::load_or_default`].
pub const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Placement of one character in the atlas, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Horizontal distance to the next glyph's origin.
    pub advance: u32,
}

/// One step of text layout, offsets relative to the text origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum LayoutItem<'a> {
    /// `offset` is the top-left of the glyph quad.
    Glyph { glyph: &'a Glyph, offset: Vec2 },
    /// Emitted after every line, including the last.
    LineEnd { width: f32, height: f32 },
}

/// A bitmap font: one atlas texture plus the glyph rectangles inside it.
#[derive(Debug)]
pub struct Font {
    glyphs: HashMap<char, Glyph>,
    texture: Texture,
    line_height: u32,
}

impl Font {
    /// Loads a TrueType/OpenType file at `px` pixels.
    pub fn from_file(device: &SharedDevice, path: impl AsRef<Path>, px: f32) -> Result<Self, FontError> {
        let path = path.as_ref();
        Self::read_file(device, path, px).inspect_err(|e| {
            log::error!("failed to load font {}: {e}", path.display());
        })
    }

    /// Like [`Font::from_file`], falling back to the first of
    /// [`SYSTEM_MONOSPACE_FONTS`] that loads. The error for `path` is
    /// returned when none does.
    pub fn load_or_default(device: &SharedDevice, path: impl AsRef<Path>, px: f32) -> Result<Self, FontError> {
        let fallbacks = SYSTEM_MONOSPACE_FONTS.iter().map(Path::new);
        Self::first_loaded(path.as_ref(), fallbacks, |p| Self::read_file(device, p, px))
    }

    fn first_loaded<'p>(
        primary: &Path,
        fallbacks: impl IntoIterator<Item = &'p Path>,
        mut load: impl FnMut(&Path) -> Result<Self, FontError>,
    ) -> Result<Self, FontError> {
        let err = match load(primary) {
            Ok(font) => return Ok(font),
            Err(err) => err,
        };
        log::warn!("font {} unavailable: {err}; trying system monospace fonts", primary.display());

        for candidate in fallbacks {
            match load(candidate) {
                Ok(font) => {
                    log::info!("using fallback font {}", candidate.display());
                    return Ok(font);
                }
                Err(e) => log::debug!("skipped fallback font {}: {e}", candidate.display()),
            }
        }

        log::error!("no usable font found for {}", primary.display());
        Err(err)
    }

    fn read_file(device: &SharedDevice, path: &Path, px: f32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rasterizer = FontdueRasterizer::from_bytes(&bytes, px)?;
        Self::build(device, &rasterizer)
    }

    pub fn from_bytes(device: &SharedDevice, bytes: &[u8], px: f32) -> Result<Self, FontError> {
        let rasterizer = FontdueRasterizer::from_bytes(bytes, px).inspect_err(|e| {
            log::error!("failed to load font: {e}");
        })?;
        Self::build(device, &rasterizer)
    }

    /// Rasterizes printable ASCII into a single-row atlas and uploads it.
    pub fn build(device: &SharedDevice, rasterizer: &dyn GlyphRasterizer) -> Result<Self, FontError> {
        let cells: Vec<_> = ATLAS_CHARS
            .filter_map(|ch| rasterizer.rasterize(ch).map(|cell| (ch, cell)))
            .filter(|(_, cell)| cell.width > 0 && cell.height > 0)
            .collect();

        let atlas_w: u32 = cells.iter().map(|(_, c)| c.width).sum();
        let atlas_h = cells.iter().map(|(_, c)| c.height).max().unwrap_or(0);
        if atlas_w == 0 || atlas_h == 0 {
            return Err(FontError::EmptyAtlas);
        }

        let mut rgba = vec![0u8; atlas_w as usize * atlas_h as usize * 4];
        let mut glyphs = HashMap::with_capacity(cells.len());
        let mut x = 0;

        for (ch, cell) in &cells {
            // Bottom-aligned so every glyph shares the atlas baseline.
            let y = atlas_h - cell.height;
            for row in 0..cell.height {
                for col in 0..cell.width {
                    let alpha = cell.coverage[(row * cell.width + col) as usize];
                    let px = (((y + row) * atlas_w + x + col) * 4) as usize;
                    rgba[px..px + 4].copy_from_slice(&[255, 255, 255, alpha]);
                }
            }
            glyphs.insert(
                *ch,
                Glyph {
                    x,
                    y,
                    width: cell.width,
                    height: cell.height,
                    advance: cell.width,
                },
            );
            x += cell.width;
        }

        let texture = Texture::from_rgba(device, atlas_w, atlas_h, &rgba)?;
        log::debug!(
            "built font atlas {atlas_w}x{atlas_h} with {} glyphs (rasterizer line height {})",
            glyphs.len(),
            rasterizer.line_height()
        );

        Ok(Self {
            glyphs,
            texture,
            line_height: atlas_h,
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_uv(&self, glyph: &Glyph) -> UvRect {
        UvRect::from_pixels(
            glyph.x as f32,
            glyph.y as f32,
            glyph.width as f32,
            glyph.height as f32,
            self.texture.width() as f32,
            self.texture.height() as f32,
        )
    }

    // ── measurement ────────────────────────────────────────────────────────

    /// Width of the widest line.
    pub fn text_width(&self, text: &str, scale: f32) -> f32 {
        self.measure(text, scale).x
    }

    /// Line count times the line height, matching where `draw_text` places
    /// the bottom of the last line.
    pub fn text_height(&self, text: &str, scale: f32) -> f32 {
        self.measure(text, scale).y
    }

    pub fn measure(&self, text: &str, scale: f32) -> Vec2 {
        let mut size = Vec2::ZERO;
        self.layout(text, scale, |item| {
            if let LayoutItem::LineEnd { width, height } = item {
                size.x = size.x.max(width);
                size.y += height;
            }
        });
        size
    }

    /// Walks `text` the way it is drawn: `\n` starts a new line one line
    /// height further down, `\r` and characters missing from the atlas are
    /// skipped, and each glyph advances the cursor by its advance. Every line is
    /// one line height tall and glyphs rest on its bottom.
    pub(crate) fn layout<'a>(&'a self, text: &str, scale: f32, mut visit: impl FnMut(LayoutItem<'a>)) {
        let line_advance = self.line_height as f32 * scale;
        let mut cursor = Vec2::ZERO;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    visit(LayoutItem::LineEnd {
                        width: cursor.x,
                        height: line_advance,
                    });
                    cursor = Vec2::new(0.0, cursor.y + line_advance);
                }
                '\r' => {}
                _ => {
                    let Some(glyph) = self.glyphs.get(&ch) else { continue };
                    let size = Vec2::new(glyph.width as f32, glyph.height as f32) * scale;
                    let offset = Vec2::new(cursor.x, cursor.y + (line_advance - size.y).max(0.0));
                    visit(LayoutItem::Glyph { glyph, offset });
                    cursor.x += glyph.advance as f32 * scale;
                }
            }
        }

        visit(LayoutItem::LineEnd {
            width: cursor.x,
            height: line_advance,
        });
    }
}
