//! The orrery viewer: frame loop, per-frame state, and the winit host.

pub mod clock;
pub mod context;
pub mod error;
pub mod frame_loop;
pub mod platform;
pub mod window;

pub use clock::{FrameClock, ManualClock, SystemClock};
pub use context::{AppContext, default_params};
pub use error::AppError;
pub use frame_loop::{FrameLoop, FrameTime, LoopState, MAX_FRAME_DELTA};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{ConfigSource, OrreryApp, run, window_attributes_from_config};
