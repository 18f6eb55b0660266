//! Debug parameter API.
//!
//! An HTTP server exposing frame metrics and a set of live-tweakable numeric
//! parameters. The frame loop writes [`DebugState`] every frame and reads the
//! parameters back; the server thread serves requests against the same state.

pub mod params;
pub mod server;

pub use params::{ParamError, TweakParam, TweakParams};
pub use server::{DebugServer, DebugServerError};

#[cfg(test)]
mod tests;

/// Environment variable overriding the configured debug port.
pub const DEBUG_PORT_ENV: &str = "ORRERY_DEBUG_PORT";

/// State shared between the frame loop and the debug server.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DebugState {
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub uptime_seconds: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub scene: String,
    pub body_count: u32,
    pub star_count: u32,
    pub pending_assets: u32,
    pub draw_calls: u32,
    pub quit_requested: bool,
    #[serde(skip)]
    pub params: TweakParams,
}

/// A debug server for `port` when enabled and compiled with debug assertions.
pub fn create_debug_server(enabled: bool, port: u16) -> Option<DebugServer> {
    (enabled && cfg!(debug_assertions)).then(|| DebugServer::new(port))
}

/// The debug port from [`DEBUG_PORT_ENV`], or `default`.
pub fn debug_port(default: u16) -> u16 {
    parse_port(std::env::var(DEBUG_PORT_ENV).ok().as_deref(), default)
}

fn parse_port(value: Option<&str>, default: u16) -> u16 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
