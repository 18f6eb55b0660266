//! Everything the viewer updates per frame, minus the GPU.
//!
//! [`AppContext`] owns the scene, its assets, pointer input, and the camera
//! rig. The window host feeds it events and a [`FrameTime`] per frame, then
//! hands the scene and camera to the renderer. Nothing here touches wgpu, so
//! the whole update path runs headless in tests.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use orrery_assets::{AssetEvent, AssetStore};
use orrery_config::Config;
use orrery_debug::{DebugState, TweakParam, TweakParams};
use orrery_input::PointerState;
use orrery_render::{Camera, OrbitControls, PhysicalSize, SurfaceResizeEvent};
use orrery_scene::{Scene, SceneError};
use orrery_space::ParallaxSmoother;
use tracing::{debug, info, warn};

use crate::frame_loop::FrameTime;

/// Decode threads for textures and models.
pub const ASSET_WORKERS: usize = 2;

pub const TIME_SCALE: &str = "time_scale";
pub const PARALLAX_GAIN: &str = "parallax_gain";
pub const PARALLAX_AMPLITUDE: &str = "parallax_amplitude";
pub const OSCILLATION_STEP: &str = "oscillation_step";
pub const STAR_SPIN: &str = "star_spin";

/// A parameter whose slider range is widened to include `value`.
///
/// Config validation accepts any finite value, so a configured value outside
/// the usual range must survive being registered.
fn seeded(label: &str, value: f32, min: f64, max: f64) -> TweakParam {
    let value = f64::from(value);
    TweakParam::new(label, value, min.min(value), max.max(value))
}

/// The live-tweakable parameters, seeded from `config`.
pub fn default_params(config: &Config) -> TweakParams {
    TweakParams::new()
        .with(TIME_SCALE, TweakParam::new("Time scale", 1.0, 0.0, 10.0))
        .with(
            PARALLAX_GAIN,
            seeded("Parallax gain", config.camera.parallax_gain, 0.0, 50.0),
        )
        .with(
            PARALLAX_AMPLITUDE,
            seeded(
                "Parallax amplitude",
                config.camera.parallax_amplitude,
                0.0,
                10.0,
            ),
        )
        .with(
            OSCILLATION_STEP,
            seeded(
                "Oscillation step (rad/frame)",
                config.bunny.oscillation_step,
                -0.2,
                0.2,
            ),
        )
        .with(
            STAR_SPIN,
            seeded("Star spin (rad/s)", config.stars.spin, -2.0, 2.0),
        )
}

/// Whether `new` differs from `old` in anything [`Scene::build`] consumed.
///
/// Oscillation step and star spin are live parameters and excluded.
pub fn scene_needs_rebuild(old: &Config, new: &Config) -> bool {
    let mut bunny = new.bunny.clone();
    bunny.oscillation_step = old.bunny.oscillation_step;
    let mut stars = new.stars.clone();
    stars.spin = old.stars.spin;

    new.scene != old.scene || new.solar != old.solar || bunny != old.bunny || stars != old.stars
}

/// Values read back from [`TweakParams`] once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LiveParams {
    time_scale: f64,
    parallax_gain: f32,
    parallax_amplitude: f32,
    oscillation_step: f32,
    star_spin: f32,
}

impl LiveParams {
    fn from_params(params: &TweakParams, fallback: &Self) -> Self {
        let read = |name: &str, current: f64| params.get(name).unwrap_or(current);
        Self {
            time_scale: read(TIME_SCALE, fallback.time_scale),
            parallax_gain: read(PARALLAX_GAIN, f64::from(fallback.parallax_gain)) as f32,
            parallax_amplitude: read(PARALLAX_AMPLITUDE, f64::from(fallback.parallax_amplitude))
                as f32,
            oscillation_step: read(OSCILLATION_STEP, f64::from(fallback.oscillation_step)) as f32,
            star_spin: read(STAR_SPIN, f64::from(fallback.star_spin)) as f32,
        }
    }

    fn from_config(config: &Config) -> Self {
        Self {
            time_scale: 1.0,
            parallax_gain: config.camera.parallax_gain,
            parallax_amplitude: config.camera.parallax_amplitude,
            oscillation_step: config.bunny.oscillation_step,
            star_spin: config.stars.spin,
        }
    }
}

pub struct AppContext {
    pub config: Config,
    pub scene: Scene,
    pub assets: AssetStore,
    pub pointer: PointerState,
    pub parallax: ParallaxSmoother,
    pub controls: OrbitControls,
    pub camera: Camera,
    debug_state: Arc<Mutex<DebugState>>,
    live: LiveParams,
    scene_time: f64,
}

impl AppContext {
    /// Build the configured scene and place the camera at its start pose.
    ///
    /// Asset loads start here; textures and models attach on later frames.
    pub fn new(config: Config) -> Result<Self, SceneError> {
        let mut assets = AssetStore::new(config.scene.asset_root.clone(), ASSET_WORKERS);
        let scene = Scene::build(&config, &mut assets)?;

        let mut camera = Camera::new(
            config.camera.fov_y_deg,
            config.camera.near,
            config.camera.far,
        );
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);

        let controls = OrbitControls::new(scene.camera.position, scene.camera.target)
            .with_damping(config.camera.enable_damping, config.camera.damping_factor)
            .with_speeds(config.camera.rotate_speed, config.camera.zoom_speed);
        controls.apply(&mut camera, Vec2::ZERO);

        let mut pointer = PointerState::new();
        pointer.set_window_size(config.window.width, config.window.height);

        let parallax =
            ParallaxSmoother::new(config.camera.parallax_gain, config.camera.parallax_amplitude);

        let params = default_params(&config);
        let live = LiveParams::from_params(&params, &LiveParams::from_config(&config));
        let debug_state = DebugState {
            scene: config.scene.variant.name().to_string(),
            body_count: scene.bodies.len() as u32,
            params,
            ..DebugState::default()
        };

        info!(
            scene = config.scene.variant.name(),
            bodies = scene.bodies.len(),
            pending_assets = assets.pending_count(),
            "Scene built"
        );

        let mut context = Self {
            live,
            config,
            scene,
            assets,
            pointer,
            parallax,
            controls,
            camera,
            debug_state: Arc::new(Mutex::new(debug_state)),
            scene_time: 0.0,
        };
        context.apply_live(live);
        Ok(context)
    }

    /// State shared with the debug server.
    pub fn debug_state(&self) -> Arc<Mutex<DebugState>> {
        Arc::clone(&self.debug_state)
    }

    /// Animation time, which advances at `time_scale` times real time.
    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    pub fn time_scale(&self) -> f64 {
        self.live.time_scale
    }

    /// Advance all time-driven state by one frame.
    pub fn update(&mut self, time: FrameTime) {
        self.apply_live_params();

        for event in self.assets.poll() {
            match event {
                AssetEvent::TextureReady(handle) => debug!(id = handle.id(), "Texture ready"),
                AssetEvent::MeshReady(handle) => debug!(id = handle.id(), "Mesh ready"),
                AssetEvent::TextureFailed(_) | AssetEvent::MeshFailed(_) => {}
            }
        }
        self.scene.resolve_assets(&self.assets);

        let scaled_dt = time.delta * self.live.time_scale as f32;
        self.scene_time += f64::from(scaled_dt);
        self.scene.animate(self.scene_time, scaled_dt);

        if self.pointer.is_dragging() {
            self.controls.rotate(self.pointer.drag_delta());
        }
        self.controls.zoom(self.pointer.scroll());
        self.controls.update();

        self.parallax.update(self.pointer.cursor(), time.delta);
        self.controls.apply(&mut self.camera, self.parallax.offset());

        self.pointer.clear_transients();
    }

    fn apply_live_params(&mut self) {
        let live = match self.debug_state.lock() {
            Ok(state) => LiveParams::from_params(&state.params, &self.live),
            Err(_) => return,
        };
        if live != self.live {
            debug!(?live, "Parameters changed");
            self.apply_live(live);
        }
    }

    fn apply_live(&mut self, live: LiveParams) {
        self.parallax.gain = live.parallax_gain;
        self.parallax.amplitude = live.parallax_amplitude;
        self.scene.set_oscillation_step(live.oscillation_step);
        self.scene.set_oscillation_rate(live.time_scale as f32);
        self.scene.set_star_spin(live.star_spin);
        self.live = live;
    }

    /// Track a new window or render size.
    pub fn resize(&mut self, event: &SurfaceResizeEvent) {
        self.pointer
            .set_window_size(event.window.width, event.window.height);
        self.camera
            .set_aspect_ratio(event.render.width as f32, event.render.height as f32);
    }

    /// Publish this frame's metrics to the debug state.
    pub fn record_frame(&self, time: FrameTime, draw_calls: usize, window: PhysicalSize) {
        let frame_time_ms = f64::from(time.delta) * 1000.0;
        let fps = if frame_time_ms > 0.0 {
            1000.0 / frame_time_ms
        } else {
            0.0
        };

        if let Ok(mut state) = self.debug_state.lock() {
            state.frame_count = time.frame;
            state.frame_time_ms = frame_time_ms;
            state.fps = fps;
            state.uptime_seconds = time.elapsed;
            state.window_width = window.width;
            state.window_height = window.height;
            state.body_count = self.scene.bodies.len() as u32;
            state.star_count = self.scene.star_count() as u32;
            state.pending_assets = self.assets.pending_count() as u32;
            state.draw_calls = draw_calls as u32;
        }
    }

    /// Whether quit was requested via the debug API.
    pub fn quit_requested(&self) -> bool {
        self.debug_state
            .lock()
            .map(|state| state.quit_requested)
            .unwrap_or(false)
    }

    /// Take settings from a reloaded config.
    ///
    /// Camera and control values apply immediately. A live parameter takes the
    /// new config value only when the file changed that value; otherwise the
    /// current (possibly HTTP-set) value is kept. Scene content is built once,
    /// so changes to it are reported and wait for a restart.
    pub fn apply_config(&mut self, config: Config) {
        if scene_needs_rebuild(&self.config, &config) {
            warn!("Scene settings changed; restart to rebuild the scene");
        }

        self.camera.fov_y = config.camera.fov_y_deg.to_radians();
        self.camera.near = config.camera.near;
        self.camera.far = config.camera.far;
        self.controls.enable_damping = config.camera.enable_damping;
        self.controls.damping_factor = config.camera.damping_factor;
        self.controls.rotate_speed = config.camera.rotate_speed;
        self.controls.zoom_speed = config.camera.zoom_speed;

        if let Ok(mut state) = self.debug_state.lock() {
            let old_seeds = default_params(&self.config);
            let mut params = default_params(&config);
            let names: Vec<String> = params.names().map(str::to_owned).collect();
            for name in names {
                if old_seeds.get(&name) != params.get(&name) {
                    continue;
                }
                let Some(current) = state.params.get(&name) else {
                    continue;
                };
                if let Err(e) = params.set(&name, current) {
                    warn!("Dropping live value for {name}: {e}");
                }
            }
            state.params = params;
        }

        info!("Applied reloaded config");
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_config::SceneVariant;
    use orrery_render::SurfaceWrapper;

    fn config(variant: SceneVariant) -> (Config, tempfile::TempDir) {
        let assets = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scene.variant = variant;
        config.scene.asset_root = assets.path().to_path_buf();
        config.stars.seed = Some(7);
        (config, assets)
    }

    fn frame(frame: u64, elapsed: f64, delta: f32) -> FrameTime {
        FrameTime {
            elapsed,
            delta,
            frame,
        }
    }

    fn set_param(ctx: &AppContext, name: &str, value: f64) {
        ctx.debug_state()
            .lock()
            .unwrap()
            .params
            .set(name, value)
            .unwrap();
    }

    #[test]
    fn test_default_params_seeded_from_config() {
        let config = Config::default();
        let params = default_params(&config);
        assert_eq!(params.len(), 5);
        assert_eq!(params.get(TIME_SCALE), Some(1.0));
        assert_eq!(
            params.get(PARALLAX_GAIN),
            Some(f64::from(config.camera.parallax_gain))
        );
        assert_eq!(params.get(STAR_SPIN), Some(f64::from(config.stars.spin)));
    }

    #[test]
    fn test_new_publishes_scene_summary() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let ctx = AppContext::new(config).unwrap();
        let state = ctx.debug_state();
        let state = state.lock().unwrap();
        assert_eq!(state.scene, "solar-system");
        assert_eq!(state.body_count, 8);
        assert_eq!(state.params.len(), 5);
    }

    #[test]
    fn test_update_advances_scene_time() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config).unwrap();
        ctx.update(frame(1, 0.5, 0.5));
        ctx.update(frame(2, 1.0, 0.5));
        assert!((ctx.scene_time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale_zero_freezes_orbits() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config).unwrap();
        ctx.update(frame(1, 0.1, 0.1));
        let before = ctx.scene_time();

        set_param(&ctx, TIME_SCALE, 0.0);
        ctx.update(frame(2, 0.2, 0.1));
        assert_eq!(ctx.scene_time(), before);
        assert_eq!(ctx.time_scale(), 0.0);
    }

    #[test]
    fn test_time_scale_zero_pauses_oscillation() {
        let (config, _assets) = config(SceneVariant::BunnyStars);
        let mut ctx = AppContext::new(config).unwrap();
        ctx.update(frame(1, 0.016, 0.016));
        let held = ctx.scene.primary_angle().unwrap();
        assert!(held != 0.0);

        set_param(&ctx, TIME_SCALE, 0.0);
        for n in 2..5 {
            ctx.update(frame(n, 0.016 * n as f64, 0.016));
            assert_eq!(ctx.scene.primary_angle(), Some(held));
        }

        set_param(&ctx, TIME_SCALE, 1.0);
        ctx.update(frame(5, 0.08, 0.016));
        assert!(ctx.scene.primary_angle().unwrap() != held);
    }

    #[test]
    fn test_configured_params_outside_slider_range_survive() {
        let (mut config, _assets) = config(SceneVariant::BunnyStars);
        config.camera.parallax_gain = 80.0;
        config.stars.spin = 3.0;
        config.bunny.oscillation_step = 0.5;
        let params = default_params(&config);
        assert_eq!(params.get(PARALLAX_GAIN), Some(80.0));
        assert_eq!(params.get(STAR_SPIN), Some(3.0));
        assert_eq!(params.get(OSCILLATION_STEP), Some(0.5));

        let mut ctx = AppContext::new(config).unwrap();
        ctx.update(frame(1, 0.016, 0.016));
        let angle = ctx.scene.primary_angle().unwrap();
        assert!((angle - 0.5).abs() < 1e-6, "angle {angle}");
        assert_eq!(ctx.parallax.gain, 80.0);
    }

    #[test]
    fn test_negative_oscillation_step_moves_bunny() {
        let (mut config, _assets) = config(SceneVariant::BunnyStars);
        config.bunny.oscillation_step = -0.05;
        let mut ctx = AppContext::new(config).unwrap();

        for n in 1..=5 {
            ctx.update(frame(n, 0.016 * n as f64, 0.016));
        }
        let angle = ctx.scene.primary_angle().unwrap();
        assert!((angle + 0.25).abs() < 1e-5, "angle {angle}");
    }

    #[test]
    fn test_oscillation_step_param_reaches_scene() {
        let (config, _assets) = config(SceneVariant::BunnyStars);
        let mut ctx = AppContext::new(config).unwrap();
        set_param(&ctx, OSCILLATION_STEP, 0.1);
        ctx.update(frame(1, 0.016, 0.016));
        let angle = ctx.scene.primary_angle().unwrap();
        assert!((angle.abs() - 0.1).abs() < 1e-6, "angle {angle}");
    }

    #[test]
    fn test_parallax_moves_camera_toward_cursor() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config).unwrap();
        let start = ctx.camera.position;

        ctx.pointer.on_cursor_moved(f64::from(ctx.config.window.width), 0.0);
        ctx.update(frame(1, 0.1, 0.1));

        let offset = ctx.parallax.offset();
        assert!(offset.x > 0.0);
        assert!(offset.y > 0.0);
        assert!(ctx.camera.position.distance(start) > 0.0);
    }

    #[test]
    fn test_parallax_gain_param_applies() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config).unwrap();
        set_param(&ctx, PARALLAX_GAIN, 0.0);
        ctx.pointer.on_cursor_moved(0.0, 0.0);
        ctx.update(frame(1, 0.1, 0.1));
        assert_eq!(ctx.parallax.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_resize_updates_camera_and_pointer() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config).unwrap();
        let surface = SurfaceWrapper::new(1000, 500, 1.0, 2.0);
        ctx.resize(&surface.event());
        assert!((ctx.camera.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_record_frame_publishes_metrics() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let ctx = AppContext::new(config).unwrap();
        ctx.record_frame(
            frame(42, 3.5, 0.02),
            9,
            PhysicalSize {
                width: 800,
                height: 600,
            },
        );

        let state = ctx.debug_state();
        let state = state.lock().unwrap();
        assert_eq!(state.frame_count, 42);
        assert!((state.fps - 50.0).abs() < 0.01);
        assert!((state.uptime_seconds - 3.5).abs() < 1e-9);
        assert_eq!(state.window_width, 800);
        assert_eq!(state.draw_calls, 9);
    }

    #[test]
    fn test_quit_flag() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let ctx = AppContext::new(config).unwrap();
        assert!(!ctx.quit_requested());
        ctx.debug_state().lock().unwrap().quit_requested = true;
        assert!(ctx.quit_requested());
    }

    #[test]
    fn test_apply_config_updates_camera_and_keeps_time_scale() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config.clone()).unwrap();
        set_param(&ctx, TIME_SCALE, 3.0);

        let mut reloaded = config;
        reloaded.camera.fov_y_deg = 60.0;
        reloaded.camera.parallax_gain = 2.0;
        ctx.apply_config(reloaded);

        assert!((ctx.camera.fov_y - 60f32.to_radians()).abs() < 1e-6);
        let state = ctx.debug_state();
        let state = state.lock().unwrap();
        assert_eq!(state.params.get(PARALLAX_GAIN), Some(2.0));
        assert_eq!(state.params.get(TIME_SCALE), Some(3.0));
    }

    #[test]
    fn test_apply_config_keeps_live_values_the_file_did_not_change() {
        let (config, _assets) = config(SceneVariant::SolarSystem);
        let mut ctx = AppContext::new(config.clone()).unwrap();
        set_param(&ctx, PARALLAX_AMPLITUDE, 4.0);
        set_param(&ctx, STAR_SPIN, -1.5);

        let mut reloaded = config;
        reloaded.camera.fov_y_deg = 50.0;
        reloaded.stars.spin = 0.75;
        ctx.apply_config(reloaded);

        let state = ctx.debug_state();
        let state = state.lock().unwrap();
        assert_eq!(state.params.get(PARALLAX_AMPLITUDE), Some(4.0));
        assert_eq!(state.params.get(STAR_SPIN), Some(0.75));
    }

    #[test]
    fn test_scene_needs_rebuild() {
        let (config, _assets) = config(SceneVariant::BunnyStars);
        assert!(!scene_needs_rebuild(&config, &config.clone()));

        let mut live_only = config.clone();
        live_only.stars.spin += 1.0;
        live_only.bunny.oscillation_step = 0.02;
        live_only.camera.fov_y_deg = 40.0;
        assert!(!scene_needs_rebuild(&config, &live_only));

        let mut reseeded = config.clone();
        reseeded.stars.seed = Some(8);
        assert!(scene_needs_rebuild(&config, &reseeded));

        let mut wider = config.clone();
        wider.bunny.oscillation_limit = 0.5;
        assert!(scene_needs_rebuild(&config, &wider));
    }
}
