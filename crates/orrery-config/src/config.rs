//! Configuration structs with sensible defaults, validation, and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Which scene to build and where its assets live.
    pub scene: SceneConfig,
    /// Sun and planets for the solar-system scene.
    pub solar: SolarConfig,
    /// Bunny model, its oscillation, and the planet orbiting it.
    pub bunny: BunnyConfig,
    /// Star scattering around the bunny.
    pub stars: StarConfig,
    /// Camera projection, orbit controls, and parallax.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// The scene variants that can be built at startup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum SceneVariant {
    /// Sun with eight planets on circular orbits.
    #[default]
    SolarSystem,
    /// Bunny model surrounded by scattered stars.
    BunnyStars,
    /// Bunny and stars plus a planet orbiting the bunny.
    BunnyStarsPlanet,
}

impl SceneVariant {
    /// Kebab-case name, matching the CLI spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::SolarSystem => "solar-system",
            Self::BunnyStars => "bunny-stars",
            Self::BunnyStarsPlanet => "bunny-stars-planet",
        }
    }
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
    /// Upper bound applied to the display scale factor.
    pub max_pixel_ratio: f64,
}

/// Scene selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Variant to build.
    pub variant: SceneVariant,
    /// Directory that texture and model paths are resolved against.
    pub asset_root: PathBuf,
    /// Linear RGB clear color.
    pub background: [f32; 3],
}

/// One body on a circular orbit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Display name.
    pub name: String,
    /// Sphere radius in scene units.
    pub radius: f32,
    /// Texture path relative to the asset root.
    pub texture: Option<String>,
    /// Tint applied on top of the texture.
    pub color: [f32; 3],
    /// Distance from the orbit centre.
    pub orbit_radius: f64,
    /// Divisor of elapsed time in the orbit angle, in seconds. Must be non-zero.
    pub period_s: f64,
}

/// Solar-system scene configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolarConfig {
    /// Sun radius.
    pub sun_radius: f32,
    /// Sun texture path.
    pub sun_texture: Option<String>,
    /// Planets, innermost first.
    pub planets: Vec<BodyConfig>,
    /// Ambient light color.
    pub ambient_color: [f32; 3],
    /// Directional light color.
    pub light_color: [f32; 3],
    /// Directional light intensity.
    pub light_intensity: f32,
    /// Directional light position; the light points from here at the origin.
    pub light_position: [f32; 3],
    /// Initial camera position.
    pub camera_position: [f32; 3],
}

/// Bunny scene configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BunnyConfig {
    /// OBJ model path relative to the asset root.
    pub model: String,
    /// Anchor position; stars scatter around it and the planet orbits it.
    pub position: [f32; 3],
    /// Uniform model scale.
    pub scale: f32,
    /// Model tint.
    pub color: [f32; 3],
    /// Rotation added each frame, in radians.
    pub oscillation_step: f32,
    /// Maximum absolute rotation, in radians.
    pub oscillation_limit: f32,
    /// Planet orbiting the bunny (bunny-stars-planet only).
    pub planet: BodyConfig,
    /// Initial camera position.
    pub camera_position: [f32; 3],
}

/// Star scattering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarConfig {
    /// Number of stars to place.
    pub count: u32,
    /// Minimum distance between any two stars.
    pub min_distance: f32,
    /// Radial sampling bound around the anchor.
    pub max_radius: f32,
    /// Lower vertical offset bound.
    pub vertical_min: f32,
    /// Upper vertical offset bound.
    pub vertical_max: f32,
    /// Lower scale bound.
    pub scale_min: f32,
    /// Upper scale bound.
    pub scale_max: f32,
    /// Candidate draws allowed per star before the batch is abandoned.
    pub max_attempts: u32,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// OBJ model for a single star; `None` uses a small sphere.
    pub model: Option<String>,
    /// Star color.
    pub color: [f32; 3],
    /// Angular speed of the star field around the anchor, radians per second.
    pub spin: f32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Enable inertial damping on the orbit controls.
    pub enable_damping: bool,
    /// Fraction of the remaining orbit velocity applied per frame.
    pub damping_factor: f32,
    /// Radians of orbit per pixel dragged.
    pub rotate_speed: f32,
    /// Zoom multiplier per scroll line.
    pub zoom_speed: f32,
    /// Parallax smoothing gain `k`.
    pub parallax_gain: f32,
    /// Camera displacement for a pointer at the window edge.
    pub parallax_amplitude: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Start the HTTP debug API (debug builds only).
    pub debug_api: bool,
    /// Port for the debug API; 0 lets the OS choose.
    pub debug_port: u16,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
            max_pixel_ratio: 2.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::default(),
            asset_root: PathBuf::from("assets"),
            // 0x000030
            background: [0.0, 0.0, 48.0 / 255.0],
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "planet".to_string(),
            radius: 0.5,
            texture: None,
            color: [1.0, 1.0, 1.0],
            orbit_radius: 6.0,
            period_s: 4.0,
        }
    }
}

impl BodyConfig {
    fn planet(name: &str, radius: f32, orbit_radius: f64, period_s: f64) -> Self {
        Self {
            name: name.to_string(),
            radius,
            texture: Some(format!("textures/{name}map.png")),
            color: [1.0, 1.0, 1.0],
            orbit_radius,
            period_s,
        }
    }
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            sun_radius: 1.0,
            sun_texture: Some("textures/sunmap.png".to_string()),
            planets: vec![
                BodyConfig::planet("mercury", 0.1, 2.0, 1.0),
                BodyConfig::planet("venus", 0.2, 4.0, 2.0),
                BodyConfig::planet("earth", 0.3, 6.0, 3.0),
                BodyConfig::planet("mars", 0.2, 9.0, 4.0),
                BodyConfig::planet("jupiter", 0.8, 12.0, 5.0),
                BodyConfig::planet("saturn", 0.6, 16.0, 6.0),
                BodyConfig::planet("uranus", 0.4, 20.0, 7.0),
                BodyConfig::planet("neptune", 0.4, 24.0, 8.0),
            ],
            // 0x404040
            ambient_color: [64.0 / 255.0; 3],
            light_color: [1.0, 1.0, 1.0],
            light_intensity: 1.0,
            light_position: [5.0, 5.0, 5.0],
            camera_position: [0.0, 20.0, 0.0],
        }
    }
}

impl Default for BunnyConfig {
    fn default() -> Self {
        Self {
            model: "models/bunny.obj".to_string(),
            position: [0.0, 0.0, 0.0],
            scale: 1.0,
            color: [0.85, 0.85, 0.9],
            oscillation_step: 0.01,
            oscillation_limit: std::f32::consts::FRAC_PI_3,
            planet: BodyConfig {
                name: "planet".to_string(),
                radius: 0.5,
                texture: Some("textures/earthmap.png".to_string()),
                color: [1.0, 1.0, 1.0],
                orbit_radius: 6.0,
                period_s: 4.0,
            },
            camera_position: [0.0, 3.0, 12.0],
        }
    }
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 50,
            min_distance: 1.0,
            max_radius: 20.0,
            vertical_min: -3.0,
            vertical_max: 3.0,
            scale_min: 0.05,
            scale_max: 0.2,
            max_attempts: 10_000,
            seed: None,
            model: None,
            color: [1.0, 0.95, 0.8],
            spin: 0.05,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            parallax_gain: 5.0,
            parallax_amplitude: 0.5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_api: true,
            debug_port: 9999,
        }
    }
}

// --- Validation ---

impl Config {
    /// Reject values that would make the scene undefined at runtime.
    ///
    /// Returns the first problem found as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid(
                "window",
                format!("size {}x{} must be non-zero", self.window.width, self.window.height),
            ));
        }
        if !(self.window.max_pixel_ratio > 0.0) {
            return Err(ConfigError::invalid(
                "window.max_pixel_ratio",
                "must be positive",
            ));
        }

        for planet in &self.solar.planets {
            planet.validate(&format!("solar.planets.{}", planet.name))?;
        }
        if !(self.solar.sun_radius > 0.0) {
            return Err(ConfigError::invalid("solar.sun_radius", "must be positive"));
        }

        self.bunny.planet.validate("bunny.planet")?;
        if !(self.bunny.oscillation_limit > 0.0) || !self.bunny.oscillation_step.is_finite() {
            return Err(ConfigError::invalid(
                "bunny.oscillation",
                "limit must be positive and step finite",
            ));
        }

        self.stars.validate()?;
        self.camera.validate()
    }
}

impl BodyConfig {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.period_s == 0.0 || !self.period_s.is_finite() {
            return Err(ConfigError::invalid(
                format!("{field}.period_s"),
                format!("orbital period {} must be finite and non-zero", self.period_s),
            ));
        }
        if !(self.radius > 0.0) {
            return Err(ConfigError::invalid(
                format!("{field}.radius"),
                "must be positive",
            ));
        }
        if !(self.orbit_radius >= 0.0) || !self.orbit_radius.is_finite() {
            return Err(ConfigError::invalid(
                format!("{field}.orbit_radius"),
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

impl StarConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.min_distance,
            self.max_radius,
            self.vertical_min,
            self.vertical_max,
            self.scale_min,
            self.scale_max,
            self.spin,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::invalid("stars", "bounds must be finite"));
        }
        if self.min_distance < 0.0 {
            return Err(ConfigError::invalid("stars.min_distance", "must be >= 0"));
        }
        if self.max_radius <= 0.0 {
            return Err(ConfigError::invalid("stars.max_radius", "must be positive"));
        }
        if self.vertical_min > self.vertical_max {
            return Err(ConfigError::invalid(
                "stars.vertical_min",
                format!(
                    "{} exceeds vertical_max {}",
                    self.vertical_min, self.vertical_max
                ),
            ));
        }
        if self.scale_min <= 0.0 || self.scale_min > self.scale_max {
            return Err(ConfigError::invalid(
                "stars.scale_min",
                "must be positive and not exceed scale_max",
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("stars.max_attempts", "must be non-zero"));
        }
        Ok(())
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(ConfigError::invalid("camera.fov_y_deg", "must be in (0, 180)"));
        }
        if !(self.near > 0.0) || !(self.far > self.near) {
            return Err(ConfigError::invalid(
                "camera.near",
                "need 0 < near < far",
            ));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(ConfigError::invalid(
                "camera.damping_factor",
                "must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Resolve a scene-relative asset path against the configured asset root.
    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.scene.asset_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_solar_system_has_eight_planets() {
        let solar = SolarConfig::default();
        assert_eq!(solar.planets.len(), 8);
        assert_eq!(solar.planets[0].name, "mercury");
        assert_eq!(solar.planets[7].orbit_radius, 24.0);
        assert_eq!(
            solar.planets[2].texture.as_deref(),
            Some("textures/earthmap.png")
        );
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("variant: SolarSystem"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), scene: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.stars, StarConfig::default());
        assert_eq!(config.solar, SolarConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config = Config::default();
        config.solar.planets[3].period_s = 0.0;
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => {
                assert_eq!(field, "solar.planets.mars.period_s");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_period_rejected() {
        let mut config = Config::default();
        config.bunny.planet.period_s = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_period_accepted() {
        let mut config = Config::default();
        config.solar.planets[0].period_s = -1.0;
        config.validate().unwrap();
    }

    #[test]
    fn test_inverted_vertical_bounds_rejected() {
        let mut config = Config::default();
        config.stars.vertical_min = 5.0;
        config.stars.vertical_max = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "stars.vertical_min"
        ));
    }

    #[test]
    fn test_scale_bounds_rejected() {
        let mut config = Config::default();
        config.stars.scale_min = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.stars.scale_min = 2.0;
        config.stars.scale_max = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempt_budget_rejected() {
        let mut config = Config::default();
        config.stars.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_vertical_bounds_accepted() {
        let mut config = Config::default();
        config.stars.vertical_min = 0.0;
        config.stars.vertical_max = 0.0;
        config.validate().unwrap();
    }

    #[test]
    fn test_camera_clip_planes_validated() {
        let mut config = Config::default();
        config.camera.far = 0.05;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.window.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.scene.variant = SceneVariant::BunnyStarsPlanet;
        config.stars.seed = Some(7);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.stars.count = 12;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().stars.count, 12);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_asset_path_joins_root() {
        let mut config = Config::default();
        config.scene.asset_root = PathBuf::from("static");
        assert_eq!(
            config.asset_path("textures/sunmap.png"),
            Path::new("static").join("textures/sunmap.png")
        );
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(SceneVariant::SolarSystem.name(), "solar-system");
        assert_eq!(SceneVariant::BunnyStarsPlanet.name(), "bunny-stars-planet");
    }
}
