//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as a RON file, are validated before a scene is
//! built, and can be overridden from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BodyConfig, BunnyConfig, CameraConfig, Config, DebugConfig, SceneConfig, SceneVariant,
    SolarConfig, StarConfig, WindowConfig,
};
pub use error::ConfigError;
