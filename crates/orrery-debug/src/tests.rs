//! Unit tests for the debug API.

use crate::{DebugServer, DebugState, ParamError, TweakParam, TweakParams, parse_port};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn sample_params() -> TweakParams {
    TweakParams::new()
        .with("time_scale", TweakParam::new("Time scale", 1.0, 0.0, 10.0))
        .with("parallax_gain", TweakParam::new("Parallax gain", 5.0, 0.0, 50.0))
}

fn start_server(state: Arc<Mutex<DebugState>>) -> DebugServer {
    let mut server = DebugServer::new(0); // port 0 = OS assigns
    server.start(state).unwrap();
    thread::sleep(Duration::from_millis(100));
    server
}

fn url(server: &DebugServer, path: &str) -> String {
    format!("http://127.0.0.1:{}{path}", server.actual_port())
}

#[test]
fn test_debug_state_default() {
    let state = DebugState::default();
    assert_eq!(state.frame_count, 0);
    assert_eq!(state.fps, 0.0);
    assert!(state.params.is_empty());
    assert!(!state.quit_requested);
}

#[test]
fn test_param_set_clamps_to_range() {
    let mut params = sample_params();
    assert_eq!(params.set("time_scale", 25.0), Ok(10.0));
    assert_eq!(params.get("time_scale"), Some(10.0));
    assert_eq!(params.set("time_scale", -1.0), Ok(0.0));
    assert_eq!(params.set("time_scale", 2.5), Ok(2.5));
}

#[test]
fn test_param_set_rejects_unknown_and_nan() {
    let mut params = sample_params();
    assert_eq!(
        params.set("gravity", 1.0),
        Err(ParamError::Unknown("gravity".to_string()))
    );
    assert!(matches!(
        params.set("time_scale", f64::NAN),
        Err(ParamError::NotFinite { .. })
    ));
    assert_eq!(params.get("time_scale"), Some(1.0));
}

#[test]
fn test_param_new_orders_bounds_and_clamps_initial_value() {
    let param = TweakParam::new("x", 20.0, 10.0, 0.0);
    assert_eq!((param.min, param.max), (0.0, 10.0));
    assert_eq!(param.value, 10.0);
}

#[test]
fn test_params_serialize_as_name_map() {
    let json = serde_json::to_value(sample_params()).unwrap();
    assert_eq!(json["time_scale"]["label"], "Time scale");
    assert_eq!(json["parallax_gain"]["max"], 50.0);
}

#[test]
fn test_parse_port() {
    assert_eq!(parse_port(Some("8080"), 9999), 8080);
    assert_eq!(parse_port(Some("nope"), 9999), 9999);
    assert_eq!(parse_port(None, 9999), 9999);
}

#[test]
fn test_debug_server_starts_and_responds() {
    let state = Arc::new(Mutex::new(DebugState::default()));
    let mut server = start_server(state);

    let resp = ureq::get(&url(&server, "/health")).call().unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
    server.stop();
    assert!(!server.is_running());
}

#[test]
fn test_metrics_endpoint_returns_valid_json() {
    let state = Arc::new(Mutex::new(DebugState {
        frame_count: 100,
        frame_time_ms: 16.6,
        fps: 60.2,
        window_width: 1920,
        window_height: 1080,
        scene: "solar-system".to_string(),
        body_count: 8,
        ..DebugState::default()
    }));
    let mut server = start_server(state);

    let resp = ureq::get(&url(&server, "/metrics")).call().unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["frame_count"], 100);
    assert!((body["fps"].as_f64().unwrap() - 60.2).abs() < 0.01);
    assert_eq!(body["scene"], "solar-system");
    assert_eq!(body["body_count"], 8);
    assert!(body.get("params").is_none());
    server.stop();
}

#[test]
fn test_params_get_and_set_over_http() {
    let state = Arc::new(Mutex::new(DebugState {
        params: sample_params(),
        ..DebugState::default()
    }));
    let mut server = start_server(state.clone());

    let resp = ureq::get(&url(&server, "/params")).call().unwrap();
    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["time_scale"]["value"], 1.0);

    let resp = ureq::post(&url(&server, "/params"))
        .set("Content-Type", "application/json")
        .send_string(r#"{"name": "time_scale", "value": 99.0}"#)
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["value"], 10.0);
    assert_eq!(state.lock().unwrap().params.get("time_scale"), Some(10.0));
    server.stop();
}

#[test]
fn test_set_unknown_param_returns_400() {
    let state = Arc::new(Mutex::new(DebugState {
        params: sample_params(),
        ..DebugState::default()
    }));
    let mut server = start_server(state);

    let resp = ureq::post(&url(&server, "/params"))
        .set("Content-Type", "application/json")
        .send_string(r#"{"name": "gravity", "value": 1.0}"#);
    match resp {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 400),
        other => panic!("Expected 400 status error, got {other:?}"),
    }
    server.stop();
}

#[test]
fn test_command_quit() {
    let state = Arc::new(Mutex::new(DebugState::default()));
    let mut server = start_server(state.clone());

    let resp = ureq::post(&url(&server, "/command"))
        .set("Content-Type", "application/json")
        .send_string(r#"{"command": "quit"}"#)
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["executed"], true);
    assert_eq!(body["command"], "quit");
    assert!(state.lock().unwrap().quit_requested);
    server.stop();
}

#[test]
fn test_unknown_command_is_not_executed() {
    let state = Arc::new(Mutex::new(DebugState::default()));
    let mut server = start_server(state.clone());

    let resp = ureq::post(&url(&server, "/command"))
        .send_string(r#"{"command": "dance"}"#)
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["executed"], false);
    assert!(!state.lock().unwrap().quit_requested);
    server.stop();
}

#[test]
fn test_unknown_endpoint_returns_404() {
    let state = Arc::new(Mutex::new(DebugState::default()));
    let mut server = start_server(state);

    let resp = ureq::get(&url(&server, "/nonexistent")).call();
    if let Err(ureq::Error::Status(code, _)) = resp {
        assert_eq!(code, 404);
    } else {
        panic!("Expected 404 status error");
    }
    server.stop();
}
