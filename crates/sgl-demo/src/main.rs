//! Sample game: camera-controlled sprites and shapes with an FPS overlay.
//!
//! Usage: `sgl-demo [font.ttf] [image]`. `SGL_FONT` is read when no font path
//! is given. A system monospace face stands in for a missing font; when none
//! loads the overlay is skipped.

use anyhow::Result;
use sgl_engine::config::{AntialiasMode, GraphicsConfig};
use sgl_engine::core::{Game, GameCtx};
use sgl_engine::graphics::{
    BatchError, Camera, DrawMode, DrawOptions, Font, LineStyle, SharedCamera, ShapeBatch,
    SpriteBatch, Texture, TextureRegion,
};
use sgl_engine::input::Key;
use sgl_engine::logging::{init_logging, LoggingConfig};
use sgl_engine::paint::Color;
use sgl_engine::window::{Runtime, RuntimeConfig};

const CAMERA_SPEED: f32 = 5.0;
const FONT_PX: f32 = 18.0;
const DEFAULT_FONT: &str = "font.ttf";

struct Assets {
    checker: Texture,
    image: Texture,
    region: TextureRegion,
    font: Option<Font>,
}

struct Demo {
    font_path: Option<String>,
    image_path: Option<String>,
    camera: SharedCamera,
    shapes: Option<ShapeBatch>,
    sprites: Option<SpriteBatch>,
    assets: Option<Assets>,
    elapsed: f32,
}

impl Demo {
    fn new(font_path: Option<String>, image_path: Option<String>) -> Self {
        Self {
            font_path,
            image_path,
            camera: Camera::new().shared(),
            shapes: None,
            sprites: None,
            assets: None,
            elapsed: 0.0,
        }
    }

    /// Degrees for the wobbling sprites.
    fn wobble(&self) -> f32 {
        (self.elapsed * std::f32::consts::PI).sin().to_degrees() * 2.0
    }

    fn draw(&mut self, ctx: &GameCtx<'_>) -> Result<(), BatchError> {
        let wobble = self.wobble();
        let (Some(sprites), Some(shapes), Some(assets)) =
            (self.sprites.as_mut(), self.shapes.as_mut(), self.assets.as_ref())
        else {
            return Ok(());
        };

        sprites.begin()?;
        sprites.draw_texture(&assets.checker, 500.0, 400.0, DrawOptions::default())?;
        sprites.draw_texture(&assets.image, 128.0, 128.0, DrawOptions::default().rotated(wobble))?;
        sprites.draw_texture(&assets.region, 600.0, 25.0, DrawOptions::default().scaled(2.0))?;
        if let Some(font) = assets.font.as_ref() {
            let hud = DrawOptions::default().hud();
            let fps = format!("FPS: {}", ctx.fps());
            let ups = format!("UPS: {}", ctx.ups());
            sprites.draw_text(font, &fps, 5.0, 0.0, hud)?;
            sprites.draw_text(font, &ups, 5.0, font.text_height(&fps, 1.0), hud)?;
            sprites.draw_text(
                font,
                "Test String",
                5.0,
                100.0,
                DrawOptions::default().tinted(Color::BLUE),
            )?;
        }
        sprites.end()?;

        shapes.begin()?;
        shapes.draw_rectangle(
            700.0,
            400.0,
            50.0,
            50.0,
            wobble,
            1.0,
            [Color::RED, Color::GREEN, Color::BLUE, Color::CHARTREUSE],
        )?;
        shapes.draw_line(
            40.0,
            560.0,
            360.0,
            520.0,
            LineStyle::gradient(Color::YELLOW, Color::MAGENTA).with_width(6.0),
        )?;
        shapes.end()?;

        shapes.begin_with_mode(DrawMode::Lines)?;
        shapes.draw_rectangle(690.0, 390.0, 70.0, 70.0, 0.0, 1.0, Color::WHITE)?;
        shapes.end()
    }
}

impl Game for Demo {
    fn initialize(&mut self, ctx: &mut GameCtx<'_>) -> Result<()> {
        let device = ctx.device();

        let mut sprites = SpriteBatch::new(device.clone());
        sprites.set_camera(Some(self.camera.clone()));
        let mut shapes = ShapeBatch::new(device.clone());
        shapes.set_camera(Some(self.camera.clone()));

        let checker = Texture::checkerboard(device, 128, 128)?;
        let image = match self.image_path.as_deref() {
            Some(path) => Texture::load_or_checkerboard(device, path)?,
            None => Texture::checkerboard(device, 64, 64)?,
        };
        let region = TextureRegion::with_size(&image, 16, 16);

        let font_path = self.font_path.as_deref().unwrap_or(DEFAULT_FONT);
        let font = Font::load_or_default(device, font_path, FONT_PX).ok();
        if font.is_none() {
            log::info!("no font loaded; text overlay disabled");
        }

        self.sprites = Some(sprites);
        self.shapes = Some(shapes);
        self.assets = Some(Assets {
            checker,
            image,
            region,
            font,
        });
        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut GameCtx<'_>) {
        // Release device resources while the device is still alive.
        self.assets = None;
        self.sprites = None;
        self.shapes = None;
    }

    fn process_input(&mut self, ctx: &mut GameCtx<'_>) {
        let input = ctx.input();
        if input.is_key_pressed(Key::Escape) {
            ctx.exit();
            return;
        }

        let mut camera = self.camera.borrow_mut();
        for (keys, dx, dy) in [
            ([Key::W, Key::Up], 0.0, -CAMERA_SPEED),
            ([Key::S, Key::Down], 0.0, CAMERA_SPEED),
            ([Key::A, Key::Left], -CAMERA_SPEED, 0.0),
            ([Key::D, Key::Right], CAMERA_SPEED, 0.0),
        ] {
            if keys.iter().any(|&k| input.is_key_down(k)) {
                camera.translate(dx, dy);
            }
        }

        if input.is_key_down(Key::Q) {
            camera.zoom_by(-0.01);
        }
        if input.is_key_down(Key::E) {
            camera.zoom_by(0.01);
        }
        let (_, wheel) = input.wheel_lines();
        if wheel != 0.0 {
            camera.zoom_by(wheel * 0.1);
        }
        if input.is_key_down(Key::Z) {
            camera.rotate(-1.0);
        }
        if input.is_key_down(Key::X) {
            camera.rotate(1.0);
        }

        if input.is_key_pressed(Key::R) {
            camera.reset_position();
        }
        if input.is_key_pressed(Key::T) {
            camera.reset_zoom();
        }
        if input.is_key_pressed(Key::Y) {
            camera.reset_rotation();
        }
        if input.is_key_pressed(Key::U) {
            camera.reset_position();
            camera.reset_zoom();
            camera.reset_rotation();
        }
    }

    fn update(&mut self, _ctx: &mut GameCtx<'_>, dt: f32) {
        self.elapsed += dt;
    }

    fn render(&mut self, ctx: &mut GameCtx<'_>) {
        if let Err(err) = self.draw(ctx) {
            log::error!("frame aborted: {err}");
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let font_path = args.next().or_else(|| std::env::var("SGL_FONT").ok());
    let image_path = args.next();

    let config = RuntimeConfig {
        title: "sgl demo".to_string(),
        vsync: false,
        graphics: GraphicsConfig {
            antialias: AntialiasMode::Msaa4x,
            clear_color: Color::DARK_GRAY,
            ..GraphicsConfig::default()
        },
        ..RuntimeConfig::default()
    };

    Runtime::run(config, Demo::new(font_path, image_path))
}
