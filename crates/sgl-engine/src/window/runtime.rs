use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::config::GraphicsConfig;
use crate::core::{FrameStats, Game, GameCtx};
use crate::device::{Gpu, GpuInit, SharedDevice, SurfaceErrorAction, WgpuDevice};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputSnapshot, InputState};
use crate::time::{FixedStep, FrameClock, FramePacer, Timer};

/// Window and loop configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
    pub vsync: bool,
    /// Frame cap while focused and vsync is off.
    pub target_fps: u32,
    /// Fixed update rate.
    pub target_ups: u32,
    /// Frame cap while the window is unfocused.
    pub idle_fps: u32,
    pub graphics: GraphicsConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "sgl".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
            fullscreen: false,
            vsync: true,
            target_fps: 144,
            target_ups: 30,
            idle_fps: 30,
            graphics: GraphicsConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `game` until it exits or the window closes.
    pub fn run<G>(config: RuntimeConfig, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything that lives as long as the window.
struct Session {
    entry: WindowEntry,
    device: Rc<RefCell<WgpuDevice>>,
    shared: SharedDevice,
    clock: FrameClock,
    step: FixedStep,
    timer: Timer,
    pacer: FramePacer,
}

impl Session {
    fn stats(&self) -> FrameStats {
        FrameStats {
            fps: self.timer.fps(),
            ups: self.timer.ups(),
            alpha: self.step.alpha(),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let viewport = self.entry.with_gpu_mut(|gpu| {
            gpu.resize(size);
            gpu.viewport()
        });
        self.device.borrow_mut().set_viewport(viewport);
        self.entry.with_window(|w| w.request_redraw());
    }
}

struct RuntimeState<G> {
    config: RuntimeConfig,
    game: G,
    session: Option<Session>,
    initialized: bool,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<G> RuntimeState<G>
where
    G: Game + 'static,
{
    fn new(config: RuntimeConfig, game: G) -> Self {
        Self {
            config,
            game,
            session: None,
            initialized: false,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_session(&self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let config = &self.config;
        let mut attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size)
            .with_resizable(config.resizable);
        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = GpuInit::with_vsync(config.vsync);
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let device = Rc::new(RefCell::new(
            entry.with_gpu(|gpu| gpu.create_graphics_device(&config.graphics)),
        ));
        let shared: SharedDevice = device.clone();

        log::info!(
            "window ready: {:?}, {} ups, vsync {}",
            entry.with_gpu(|gpu| gpu.size()),
            config.target_ups,
            config.vsync
        );

        Ok(Session {
            entry,
            device,
            shared,
            clock: FrameClock::new(),
            step: FixedStep::new(config.target_ups),
            timer: Timer::new(),
            pacer: FramePacer::new(),
        })
    }

    /// Calls `Game::shutdown` at most once, while the device is still alive.
    fn shutdown(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !self.initialized {
            return;
        }
        self.initialized = false;

        let input = InputSnapshot::default();
        let viewport = session.entry.with_gpu(|gpu| gpu.viewport());
        let mut ctx = GameCtx::new(&session.shared, &input, viewport, session.stats());
        self.game.shutdown(&mut ctx);
        log::debug!("game shut down");
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let game = &mut self.game;
        let clear = self.config.graphics.clear_color;

        let time = session.clock.tick();
        session.timer.tick(time.dt);

        let input = session
            .entry
            .with_mut(|f| InputSnapshot::capture(f.input_state, f.input_frame));
        session.entry.with_input_frame_mut(|f| f.clear());

        let viewport = session.entry.with_gpu(|gpu| gpu.viewport());
        let mut ctx = GameCtx::new(&session.shared, &input, viewport, session.stats());

        game.process_input(&mut ctx);

        let steps = session.step.advance(time.dt);
        let interval = session.step.interval();
        for _ in 0..steps {
            game.update(&mut ctx, interval);
            session.timer.count_update();
        }

        let device = &session.device;
        let action = session.entry.with_mut(|f| match f.gpu.begin_frame() {
            Ok(mut frame) => {
                game.render(&mut ctx);
                device
                    .borrow_mut()
                    .render(&mut frame.encoder, &frame.view, clear);
                f.window.pre_present_notify();
                f.gpu.submit(frame);
                None
            }
            Err(err) => Some(f.gpu.handle_surface_error(err)),
        });
        let exit = ctx.exit_requested();

        match action {
            None => {
                session.timer.count_frame();
                session.pacer.mark(Instant::now());
            }
            Some(SurfaceErrorAction::Fatal) => {
                let err = anyhow!("surface lost and could not be recovered");
                self.shutdown();
                self.fail(event_loop, err);
                return;
            }
            Some(action) => log::debug!("frame skipped: {action:?}"),
        }

        self.exit_requested |= exit;
    }
}

impl<G> ApplicationHandler for RuntimeState<G>
where
    G: Game + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        let session = match self.create_session(event_loop) {
            Ok(session) => session,
            Err(err) => return self.fail(event_loop, err),
        };

        let input = InputSnapshot::default();
        let viewport = session.entry.with_gpu(|gpu| gpu.viewport());
        let mut ctx = GameCtx::new(&session.shared, &input, viewport, session.stats());
        let result = self.game.initialize(&mut ctx);
        let exit = ctx.exit_requested();
        self.session = Some(session);

        if let Err(err) = result {
            return self.fail(event_loop, err.context("game initialization failed"));
        }
        self.initialized = true;
        self.exit_requested |= exit;

        if let Some(session) = self.session.as_mut() {
            session.clock.reset();
            session.entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.shutdown();
            event_loop.exit();
            return;
        }

        let Some(session) = self.session.as_ref() else {
            return;
        };

        let focused = session.entry.borrow_input_state().focused;
        if self.config.vsync && focused {
            event_loop.set_control_flow(ControlFlow::Wait);
            session.entry.with_window(|w| w.request_redraw());
            return;
        }

        let fps = if focused {
            self.config.target_fps
        } else {
            self.config.idle_fps
        };
        let deadline = session.pacer.next_deadline(fps);
        if Instant::now() >= deadline {
            event_loop.set_control_flow(ControlFlow::Wait);
            session.entry.with_window(|w| w.request_redraw());
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.entry.with_mut(|f| {
            translate_window_event(&event, |ev| f.input_state.apply_event(f.input_frame, ev));
        });

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                self.exit_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => session.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = session.entry.with_window(|w| w.inner_size());
                session.resize(size);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
        self.session = None;
    }
}
