//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`]. Each
//! `RedrawRequested` runs one frame (measure, update, render, publish
//! metrics) and requests the next redraw, so frames follow the display's
//! present rate.

use std::path::PathBuf;
use std::sync::Arc;

use orrery_config::{CliArgs, Config};
use orrery_debug::{DebugServer, create_debug_server, debug_port};
use orrery_render::{
    RenderContext, RenderStats, SceneRenderer, SurfaceError, SurfaceResizeEvent, SurfaceWrapper,
    init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::context::AppContext;
use crate::error::AppError;
use crate::frame_loop::FrameLoop;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

/// Where `config.ron` lives and what the command line changed on top of it.
///
/// Reloads re-apply the same overrides, so a reload only reports edits made
/// to the file itself.
pub struct ConfigSource {
    pub dir: PathBuf,
    pub on_disk: Config,
    pub overrides: CliArgs,
}

impl ConfigSource {
    /// The effective config after a file edit, or `None` if the file is
    /// unchanged.
    pub fn reload(&mut self) -> Result<Option<Config>, orrery_config::ConfigError> {
        let Some(on_disk) = self.on_disk.reload(&self.dir)? else {
            return Ok(None);
        };
        let mut effective = on_disk.clone();
        effective.apply_cli_overrides(&self.overrides);
        effective.validate()?;
        self.on_disk = on_disk;
        Ok(Some(effective))
    }
}

pub struct OrreryApp {
    context: AppContext,
    frame_loop: FrameLoop,
    surface: SurfaceWrapper,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    debug_server: Option<DebugServer>,
    config_source: Option<ConfigSource>,
    failure: Option<AppError>,
}

impl OrreryApp {
    /// Build the scene. The window and GPU come up on the first `resumed`.
    pub fn new(config: Config, config_source: Option<ConfigSource>) -> Result<Self, AppError> {
        let surface = SurfaceWrapper::new(
            config.window.width,
            config.window.height,
            1.0,
            config.window.max_pixel_ratio,
        );
        Ok(Self {
            context: AppContext::new(config)?,
            frame_loop: FrameLoop::default(),
            surface,
            window: None,
            gpu: None,
            renderer: None,
            debug_server: None,
            config_source,
            failure: None,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// The error that ended the event loop, if any.
    pub fn into_result(self) -> Result<(), AppError> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attrs = window_attributes_from_config(&self.context.config);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.surface = SurfaceWrapper::new(
            inner_size.width,
            inner_size.height,
            scale_factor,
            self.context.config.window.max_pixel_ratio,
        );
        let render = self.surface.render_size();
        info!(
            "Surface initialized: {}x{} window, {}x{} render (pixel ratio {:.2})",
            inner_size.width,
            inner_size.height,
            render.width,
            render.height,
            self.surface.pixel_ratio()
        );

        let gpu = init_render_context_blocking(
            Arc::clone(&window),
            render.width,
            render.height,
            self.context.config.window.vsync,
        )?;
        let renderer = SceneRenderer::new(&gpu)?;

        self.context.resize(&self.surface.event());
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn start_debug_server(&mut self) {
        let debug = &self.context.config.debug;
        let Some(mut server) = create_debug_server(debug.debug_api, debug_port(debug.debug_port))
        else {
            return;
        };
        match server.start(self.context.debug_state()) {
            Ok(()) => self.debug_server = Some(server),
            Err(e) => warn!("Failed to start debug server: {e}"),
        }
    }

    fn apply_resize(&mut self, resize: SurfaceResizeEvent) {
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(resize.render.width, resize.render.height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(gpu);
            }
        }
        self.context.resize(&resize);
        info!(
            "Window resized to {}x{} (render {}x{}, pixel ratio {:.2})",
            resize.window.width,
            resize.window.height,
            resize.render.width,
            resize.render.height,
            resize.pixel_ratio
        );
    }

    fn render_frame(&mut self) -> Result<RenderStats, SurfaceError> {
        let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) else {
            return Ok(RenderStats::default());
        };
        renderer.render(
            gpu,
            &self.context.scene,
            &self.context.camera,
            &self.context.assets,
        )
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(time) = self.frame_loop.tick() else {
            return;
        };

        self.context.update(time);

        let draw_calls = match self.render_frame() {
            Ok(stats) => stats.draw_calls,
            Err(SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                0
            }
            Err(e) => {
                error!("Rendering failed: {e}");
                self.failure = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        self.context
            .record_frame(time, draw_calls, self.surface.window_size());

        if self.context.quit_requested() {
            info!("Quit requested via debug API");
            event_loop.exit();
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn reload_config(&mut self) {
        let Some(source) = &mut self.config_source else {
            return;
        };
        match source.reload() {
            Ok(Some(config)) => self.context.apply_config(config),
            Ok(None) => {}
            Err(e) => warn!("Ignoring config reload: {e}"),
        }
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.initialize(event_loop) {
            error!("{e}");
            self.failure = Some(e);
            event_loop.exit();
            return;
        }

        self.start_debug_server();

        self.frame_loop.start();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(inner) = self.window.as_ref().map(|w| w.inner_size()) else {
                    return;
                };
                let resize = self.surface.handle_scale_factor_changed(
                    scale_factor,
                    inner.width,
                    inner.height,
                );
                self.apply_resize(resize);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.context.pointer.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.context.pointer.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.context.pointer.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => self.context.pointer.on_cursor_entered(),
            WindowEvent::CursorLeft { .. } => self.context.pointer.on_cursor_left(),
            WindowEvent::Focused(true) => self.reload_config(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
        if let Some(server) = &mut self.debug_server {
            server.stop();
        }
        info!(frames = self.frame_loop.frame_count(), "Exiting");
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config, config_source: Option<ConfigSource>) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = OrreryApp::new(config, config_source)?;
    event_loop.run_app(&mut app)?;
    app.into_result()
}
