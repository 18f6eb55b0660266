use orrery_config::ConfigError;
use orrery_render::{RenderContextError, SurfaceError, TextureError};
use orrery_scene::SceneError;

use crate::platform::PlatformError;

/// Anything that stops the viewer from starting or keeps it from running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("GPU initialization failed: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error("placeholder texture: {0}")]
    Texture(#[from] TextureError),

    #[error("surface: {0}")]
    Surface(#[from] SurfaceError),
}
