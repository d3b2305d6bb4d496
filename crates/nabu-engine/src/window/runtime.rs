use anyhow::{Context as _, Result};
use ouroboros::self_referencing;

use nabu_gui::{Context, FontConfig};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorIcon, Window, WindowId};

use crate::backend::{RenderBackend, TransientPoolConfig, ViewId, WgpuBackend};
use crate::bridge::{self, BridgeConfig, GuiBridge};
use crate::core::{App, AppControl, EventCtx, FrameCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::InputEvent;
use crate::platform::{translate_window_event, Platform, PlatformState, WinitPlatform};
use crate::time::FrameClock;

/// View cleared at the start of every frame, below the GUI view.
const CLEAR_VIEW: ViewId = 0;

/// Window and GUI setup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// 0xRRGGBBAA.
    pub clear_color: u32,
    pub font: FontConfig,
    pub bridge: BridgeConfig,
    pub transient_pool: TransientPoolConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "nabu".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: 0x1a1a1fff,
            font: FontConfig::default(),
            bridge: BridgeConfig::default(),
            transient_pool: TransientPoolConfig::default(),
        }
    }
}

/// Requests from app callbacks, applied once the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    /// 0xRRGGBBAA, from the next frame on.
    pub fn set_clear_color(&mut self, rgba: u32) {
        self.commands.push(Command::SetClearColor(rgba));
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Command {
    Exit,
    SetClearColor(u32),
}

/// Entry point: opens one window and drives `app` until it exits.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut state = AppState {
            config,
            gpu_init,
            app,
            session: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything tied to the open window.
struct Session {
    entry: WindowEntry,
    backend: WgpuBackend,
    gui: Context,
    bridge: GuiBridge<CursorIcon>,
    platform: PlatformState,
    clock: FrameClock,
    events: Vec<InputEvent>,
    clear_color: u32,
}

impl Session {
    fn create(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop.create_window(attrs).context("failed to create window")?;

        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let mut backend = entry.with_gpu(|gpu| {
            WgpuBackend::new(
                gpu.device().clone(),
                gpu.queue().clone(),
                gpu.surface_format(),
                config.transient_pool,
            )
        });

        let mut gui = Context::create(config.font.clone());
        let (platform, bridge) = entry.with_window(|window| {
            let mut state = PlatformState::new(window);
            let bridge = GuiBridge::init(
                &mut gui,
                &mut WinitPlatform::new(window, &mut state),
                &mut backend,
                &config.bridge,
            );
            (state, bridge)
        });
        let bridge = bridge.context("GUI bridge initialization failed")?;

        let mut session = Self {
            entry,
            backend,
            gui,
            bridge,
            platform,
            clock: FrameClock::new(),
            events: Vec::new(),
            clear_color: config.clear_color,
        };
        let (w, h) = session.entry.with_gpu(|gpu| gpu.size());
        session.resize(w, h);

        log::info!("Runtime: window '{}' ready ({w}x{h})", config.title);
        Ok(session)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.entry.with_gpu_mut(|gpu| gpu.resize(width, height));
        self.bridge.reset(&mut self.backend, width, height);
        let w = u16::try_from(width).unwrap_or(u16::MAX);
        let h = u16::try_from(height).unwrap_or(u16::MAX);
        self.backend.set_view_rect(CLEAR_VIEW, 0, 0, w, h);
    }

    /// Feeds a window event to the GUI, then to the app.
    fn handle_event<A: App>(&mut self, event: &WindowEvent, app: &mut A) -> AppControl {
        let Self { entry, gui, platform, events, .. } = self;

        entry.with_window(|window| translate_window_event(window, event, events));

        let mut control = AppControl::Continue;
        for ev in events.drain(..) {
            platform.observe(&ev);
            bridge::input::apply_event(gui.io_mut(), &ev);

            let ctx = EventCtx {
                gui_wants_keyboard: bridge::input::wants_keyboard(gui.io()),
                gui_wants_mouse: bridge::input::wants_mouse(gui.io()),
            };
            if app.on_event(&ev, &ctx) == AppControl::Exit {
                control = AppControl::Exit;
            }
        }
        control
    }

    /// Runs one GUI frame and presents it.
    fn frame<A: App>(&mut self, app: &mut A, runtime: &mut RuntimeCtx) -> AppControl {
        let Self {
            entry,
            backend,
            gui,
            bridge,
            platform,
            clock,
            clear_color,
            ..
        } = self;

        let time = clock.tick();

        entry.with_mut(|fields| {
            let window: &Window = fields.window;
            let gpu = fields.gpu;
            let size = gpu.size();

            let mut os = WinitPlatform::new(window, platform);
            bridge.sync_frame(gui, &mut os, time.dt);
            let window_size = os.window_size();

            let mut control = {
                let mut ui = gui.new_frame();
                let mut ctx = FrameCtx {
                    time,
                    window_size,
                    framebuffer_size: size,
                    stats: backend.stats(),
                    runtime,
                };
                app.on_frame(&mut ctx, &mut ui)
            };

            backend.set_view_clear(CLEAR_VIEW, *clear_color);
            backend.touch(CLEAR_VIEW);
            bridge.render_draw_data(backend, gui.render());

            if size.0 == 0 || size.1 == 0 {
                backend.discard_frame();
                return control;
            }

            match gpu.acquire() {
                Ok(mut frame) => {
                    backend.frame(&mut frame.encoder, &frame.view, size);
                    window.pre_present_notify();
                    gpu.present(frame);
                }
                Err(err) => {
                    backend.discard_frame();
                    log::debug!("Runtime: surface acquisition failed: {err}");
                    if gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                        log::error!("Runtime: unrecoverable surface error");
                        control = AppControl::Exit;
                    }
                }
            }
            control
        })
    }

    fn request_redraw(&self) {
        self.entry.with_window(|w| w.request_redraw());
    }

    fn window_id(&self) -> WindowId {
        self.entry.with_window(|w| w.id())
    }

    /// Releases bridge resources before the GPU and window go away.
    fn shutdown(self) {
        let Self {
            entry,
            mut backend,
            mut gui,
            bridge,
            mut platform,
            ..
        } = self;

        entry.with_window(|window| {
            bridge.shutdown(&mut gui, &mut WinitPlatform::new(window, &mut platform), &mut backend);
        });
        drop(gui);
        drop(backend);
        drop(entry);
        log::info!("Runtime: window closed");
    }
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    session: Option<Session>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
        event_loop.exit();
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, runtime: RuntimeCtx) {
        for cmd in runtime.commands {
            match cmd {
                Command::Exit => self.request_exit(event_loop),
                Command::SetClearColor(rgba) => {
                    if let Some(session) = self.session.as_mut() {
                        session.clear_color = rgba;
                    }
                }
            }
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.exit_requested {
            return;
        }

        match Session::create(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(session) => {
                session.request_redraw();
                self.session = Some(session);
            }
            Err(e) => {
                log::error!("failed to start: {e:#}");
                self.request_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // The GUI is redrawn continuously.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(session) = self.session.as_ref() {
            session.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.window_id() != window_id {
            return;
        }

        if session.handle_event(&event, &mut self.app) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(size) => {
                session.resize(size.width, size.height);
                session.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = session.entry.with_window(|w| w.inner_size());
                session.resize(size.width, size.height);
                session.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let mut runtime = RuntimeCtx::default();
                if session.frame(&mut self.app, &mut runtime) == AppControl::Exit {
                    runtime.exit();
                }
                self.apply_commands(event_loop, runtime);
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_queued_in_order() {
        let mut ctx = RuntimeCtx::default();
        ctx.set_clear_color(0x000000ff);
        ctx.exit();
        assert_eq!(ctx.commands, vec![Command::SetClearColor(0x000000ff), Command::Exit]);
    }

    #[test]
    fn default_config_draws_gui_above_clear_view() {
        let config = RuntimeConfig::default();
        assert!(config.bridge.view_id > CLEAR_VIEW);
        assert_eq!(config.clear_color, 0x1a1a1fff);
    }
}
