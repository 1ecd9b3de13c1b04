use super::FontError;

/// An 8-bit coverage cell for one character.
///
/// The cell is `width × height` (row-major, top row first) with the glyph
/// drawn on the font baseline, so cells of one font line up when placed
/// side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl RasterizedGlyph {
    /// A cell with no ink, e.g. a space.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }
}

/// Produces glyph cells for atlas construction.
pub trait GlyphRasterizer {
    /// Height of one line of text in pixels.
    fn line_height(&self) -> u32;

    /// `None` when the font has no glyph for `ch`.
    fn rasterize(&self, ch: char) -> Option<RasterizedGlyph>;
}

/// [`GlyphRasterizer`] over a TrueType/OpenType face, via fontdue.
pub struct FontdueRasterizer {
    font: fontdue::Font,
    px: f32,
    ascent: f32,
    line_height: u32,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: &[u8], px: f32) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let metrics = font
            .horizontal_line_metrics(px)
            .ok_or_else(|| FontError::Parse("face has no horizontal metrics".into()))?;

        let ascent = metrics.ascent.ceil();
        let line_height = (ascent - metrics.descent.floor()).max(1.0) as u32;

        Ok(Self {
            font,
            px,
            ascent,
            line_height,
        })
    }

    pub fn pixel_size(&self) -> f32 {
        self.px
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn rasterize(&self, ch: char) -> Option<RasterizedGlyph> {
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let (metrics, bitmap) = self.font.rasterize(ch, self.px);
        let width = metrics.advance_width.ceil() as u32;
        if width == 0 {
            return None;
        }

        let mut cell = RasterizedGlyph::blank(width, self.line_height);
        let baseline = self.ascent as i32;
        let top = baseline - metrics.ymin - metrics.height as i32;

        for row in 0..metrics.height {
            let y = top + row as i32;
            if y < 0 || y >= cell.height as i32 {
                continue;
            }
            for col in 0..metrics.width {
                let x = metrics.xmin + col as i32;
                if x < 0 || x >= cell.width as i32 {
                    continue;
                }
                let dst = y as usize * cell.width as usize + x as usize;
                let src = bitmap[row * metrics.width + col];
                cell.coverage[dst] = cell.coverage[dst].max(src);
            }
        }
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_font_bytes_fail_to_parse() {
        assert!(matches!(
            FontdueRasterizer::from_bytes(b"definitely not a font", 16.0),
            Err(FontError::Parse(_))
        ));
    }

    #[test]
    fn blank_cell_has_no_ink() {
        let cell = RasterizedGlyph::blank(3, 4);
        assert_eq!(cell.coverage.len(), 12);
        assert!(cell.coverage.iter().all(|&c| c == 0));
    }
}
