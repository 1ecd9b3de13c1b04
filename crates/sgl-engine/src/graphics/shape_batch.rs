use glam::{Mat4, Vec2};

use crate::device::{ProgramKind, SharedDevice, Topology};
use crate::paint::Color;

use super::batch::{quad_model, to_clip, VertexBatch, DEFAULT_CAPACITY, QUAD_TRIANGLES, UNIT_CORNERS};
use super::camera::SharedCamera;
use super::BatchError;

/// Stroke width used when a line style does not set one.
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// How a [`ShapeBatch`] assembles its geometry for one begin/end run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    #[default]
    Filled,
}

impl DrawMode {
    pub const fn topology(self) -> Topology {
        match self {
            DrawMode::Points => Topology::Points,
            DrawMode::Lines => Topology::Lines,
            DrawMode::Filled => Topology::Triangles,
        }
    }

    /// The raw mode code (`0` points, `1` lines, `4` filled).
    pub const fn code(self) -> u32 {
        match self {
            DrawMode::Points => 0,
            DrawMode::Lines => 1,
            DrawMode::Filled => 4,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            DrawMode::Points => "points",
            DrawMode::Lines => "lines",
            DrawMode::Filled => "filled",
        }
    }
}

impl TryFrom<u32> for DrawMode {
    type Error = BatchError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DrawMode::Points),
            1 => Ok(DrawMode::Lines),
            4 => Ok(DrawMode::Filled),
            other => {
                log::error!("invalid shape draw mode {other}");
                Err(BatchError::InvalidDrawMode(other))
            }
        }
    }
}

/// Colors for the four corners of a rectangle, in the order top-left,
/// top-right, bottom-right, bottom-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CornerColors(pub [Color; 4]);

impl From<Color> for CornerColors {
    fn from(c: Color) -> Self {
        CornerColors([c; 4])
    }
}

/// Alternating pair: `(c1, c2, c1, c2)`.
impl From<(Color, Color)> for CornerColors {
    fn from((c1, c2): (Color, Color)) -> Self {
        CornerColors([c1, c2, c1, c2])
    }
}

impl From<[Color; 4]> for CornerColors {
    fn from(colors: [Color; 4]) -> Self {
        CornerColors(colors)
    }
}

/// Appearance of a line segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    /// Degrees, about the segment midpoint.
    pub rotation: f32,
    /// Stroke width in pixels. Only filled mode draws thick lines.
    pub width: f32,
    pub start: Color,
    pub end: Color,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::solid(Color::WHITE)
    }
}

impl LineStyle {
    pub fn solid(color: Color) -> Self {
        Self::gradient(color, color)
    }

    pub fn gradient(start: Color, end: Color) -> Self {
        Self {
            rotation: 0.0,
            width: DEFAULT_LINE_WIDTH,
            start,
            end,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Batches colored points, lines and rectangles.
pub struct ShapeBatch {
    engine: VertexBatch,
    mode: DrawMode,
}

impl ShapeBatch {
    pub fn new(device: SharedDevice) -> Self {
        Self::with_capacity(device, DEFAULT_CAPACITY)
    }

    /// `capacity` is the vertex buffer size in floats, rounded down to whole
    /// vertices and raised to fit at least one primitive.
    pub fn with_capacity(device: SharedDevice, capacity: usize) -> Self {
        Self {
            engine: VertexBatch::new(device, ProgramKind::Shape, capacity),
            mode: DrawMode::Filled,
        }
    }

    pub fn set_camera(&mut self, camera: Option<SharedCamera>) {
        self.engine.set_camera(camera);
    }

    pub fn camera(&self) -> Option<&SharedCamera> {
        self.engine.camera()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.engine.is_recording()
    }

    /// Draw calls issued since the last `begin`.
    pub fn render_calls(&self) -> usize {
        self.engine.render_calls()
    }

    pub fn total_render_calls(&self) -> usize {
        self.engine.total_render_calls()
    }

    /// Starts a filled run.
    pub fn begin(&mut self) -> Result<(), BatchError> {
        self.begin_with_mode(DrawMode::Filled)
    }

    pub fn begin_with_mode(&mut self, mode: DrawMode) -> Result<(), BatchError> {
        self.engine.begin()?;
        self.mode = mode;
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), BatchError> {
        self.engine.end(self.mode.topology())
    }

    // ── primitives ─────────────────────────────────────────────────────────

    pub fn draw_point(&mut self, x: f32, y: f32, color: Color) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;
        if self.mode != DrawMode::Points {
            log::error!("draw_point requires points mode (current: {})", self.mode.name());
            return Err(BatchError::UnsupportedInMode {
                primitive: "point",
                mode: self.mode.name(),
            });
        }
        self.reserve(1);
        let mvp = self.engine.mvp(Mat4::IDENTITY, true);
        self.emit(to_clip(&mvp, Vec2::new(x, y)), color);
        Ok(())
    }

    pub fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        style: LineStyle,
    ) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;

        let p1 = Vec2::new(x1, y1);
        let p2 = Vec2::new(x2, y2);
        let mid = (p1 + p2) * 0.5;
        let model = Mat4::from_translation(mid.extend(0.0))
            * Mat4::from_rotation_z(style.rotation.to_radians())
            * Mat4::from_translation(-mid.extend(0.0));
        let mvp = self.engine.mvp(model, true);

        match self.mode {
            DrawMode::Points | DrawMode::Lines => {
                self.reserve(2);
                self.emit(to_clip(&mvp, p1), style.start);
                self.emit(to_clip(&mvp, p2), style.end);
            }
            DrawMode::Filled => {
                let Some(dir) = (p2 - p1).try_normalize() else {
                    return Ok(());
                };
                let offset = Vec2::new(dir.y, -dir.x) * (style.width * 0.5);
                let corners = [p1 + offset, p2 + offset, p2 - offset, p1 - offset];
                let colors = [style.start, style.end, style.end, style.start];

                self.reserve(QUAD_TRIANGLES.len());
                for i in QUAD_TRIANGLES {
                    self.emit(to_clip(&mvp, corners[i]), colors[i]);
                }
            }
        }
        Ok(())
    }

    /// Draws a `w × h` rectangle at `(x, y)`, rotated `rotation` degrees
    /// about its center and scaled by `scale`.
    ///
    /// `colors` is one color, a `(c1, c2)` pair or four corner colors.
    pub fn draw_rectangle(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
        scale: f32,
        colors: impl Into<CornerColors>,
    ) -> Result<(), BatchError> {
        self.engine.ensure_recording()?;

        let CornerColors(colors) = colors.into();
        let mvp = self.engine.mvp(quad_model(x, y, w, h, rotation, scale), true);
        let corners = UNIT_CORNERS.map(|c| to_clip(&mvp, c));

        match self.mode {
            DrawMode::Filled => {
                self.reserve(QUAD_TRIANGLES.len());
                for i in QUAD_TRIANGLES {
                    self.emit(corners[i], colors[i]);
                }
            }
            DrawMode::Lines => {
                self.reserve(8);
                for i in 0..4 {
                    let j = (i + 1) % 4;
                    self.emit(corners[i], colors[i]);
                    self.emit(corners[j], colors[j]);
                }
            }
            DrawMode::Points => {
                self.reserve(4);
                for (corner, color) in corners.into_iter().zip(colors) {
                    self.emit(corner, color);
                }
            }
        }
        Ok(())
    }

    /// Convenience for an axis-aligned, unscaled, single-color rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<(), BatchError> {
        self.draw_rectangle(x, y, w, h, 0.0, 1.0, color)
    }

    // ── helpers ────────────────────────────────────────────────────────────

    fn reserve(&mut self, vertices: usize) {
        if !self.engine.has_room(vertices) {
            self.engine.flush(self.mode.topology());
        }
    }

    fn emit(&mut self, p: Vec2, c: Color) {
        self.engine.push(&[p.x, p.y, c.r(), c.g(), c.b(), c.a()]);
    }
}
