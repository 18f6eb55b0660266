//! HTTP debug server implementation.

use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::DebugState;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum DebugServerError {
    #[error("Failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("Failed to spawn server thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Debug state lock poisoned")]
    StatePoisoned,
}

/// HTTP server for the debug API.
/// Runs on a background thread; the frame loop shares [`DebugState`] with it.
pub struct DebugServer {
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

#[derive(Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Deserialize)]
struct SetParam {
    name: String,
    value: f64,
}

#[derive(Serialize)]
struct SetParamResponse {
    name: String,
    value: f64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type HttpResponse = Response<Cursor<Vec<u8>>>;

impl DebugServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            handle: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&mut self, state: Arc<Mutex<DebugState>>) -> Result<(), DebugServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            DebugServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);
        self.shutdown.store(false, Ordering::SeqCst);

        let shutdown = Arc::clone(&self.shutdown);
        let handle = thread::Builder::new()
            .name("debug-server".to_string())
            .spawn(move || Self::run_server(server, state, shutdown))?;
        self.handle = Some(handle);

        log::info!("Debug API listening on http://127.0.0.1:{actual_port}");
        Ok(())
    }

    /// Signal the server thread and wait for it to finish its current request.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Debug server thread panicked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: Server, state: Arc<Mutex<DebugState>>, shutdown: Arc<AtomicBool>) {
        while !shutdown.load(Ordering::SeqCst) {
            match server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => {
                    if let Err(e) = Self::handle_request(request, &state) {
                        log::warn!("Debug server error: {e}");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("Debug server stopped: {e}");
                    break;
                }
            }
        }
    }

    fn handle_request(
        mut request: Request,
        state: &Arc<Mutex<DebugState>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = match (request.method(), request.url()) {
            (&Method::Get, "/health") => {
                let debug_state = lock(state)?;
                json_response(
                    200,
                    &HealthResponse {
                        status: "ok",
                        uptime_seconds: debug_state.uptime_seconds,
                    },
                )?
            }
            (&Method::Get, "/metrics") => {
                let debug_state = lock(state)?;
                json_response(200, &*debug_state)?
            }
            (&Method::Get, "/params") => {
                let debug_state = lock(state)?;
                json_response(200, &debug_state.params)?
            }
            (&Method::Post, "/params") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                match serde_json::from_str::<SetParam>(&body) {
                    Ok(set) => {
                        let result = lock(state)?.params.set(&set.name, set.value);
                        match result {
                            Ok(value) => json_response(
                                200,
                                &SetParamResponse {
                                    name: set.name,
                                    value,
                                },
                            )?,
                            Err(e) => error_response(400, e.to_string())?,
                        }
                    }
                    Err(e) => error_response(400, e.to_string())?,
                }
            }
            (&Method::Post, "/command") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                match serde_json::from_str::<Command>(&body) {
                    Ok(command) => {
                        let executed = match command.command.as_str() {
                            "quit" => {
                                lock(state)?.quit_requested = true;
                                true
                            }
                            _ => false,
                        };
                        json_response(
                            200,
                            &CommandResponse {
                                executed,
                                command: command.command,
                            },
                        )?
                    }
                    Err(e) => error_response(400, e.to_string())?,
                }
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

fn lock(state: &Arc<Mutex<DebugState>>) -> Result<MutexGuard<'_, DebugState>, DebugServerError> {
    state.lock().map_err(|_| DebugServerError::StatePoisoned)
}

fn json_response<T: Serialize + ?Sized>(
    status: u16,
    body: &T,
) -> Result<HttpResponse, serde_json::Error> {
    let json = serde_json::to_string(body)?;
    let mut response = Response::from_string(json).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    Ok(response)
}

fn error_response(status: u16, error: String) -> Result<HttpResponse, serde_json::Error> {
    json_response(status, &ErrorResponse { error })
}

impl Drop for DebugServer {
    fn drop(&mut self) {
        self.stop();
    }
}
