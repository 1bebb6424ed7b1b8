use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use servodeck_api::DeviceStatus;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    Healthy,
    ServerError,
    Garbage,
}

pub struct DeviceState {
    pub status: DeviceStatus,
    pub mode: StatusMode,
    /// Every command request as path and query
    pub commands: Vec<String>,
}

type SharedState = Arc<Mutex<DeviceState>>;

/// Stand-in for the device web server, bound to an ephemeral local port.
pub struct MockDevice {
    pub base_url: String,
    pub state: SharedState,
}

impl MockDevice {
    pub async fn start(status: DeviceStatus) -> Self {
        let state = Arc::new(Mutex::new(DeviceState {
            status,
            mode: StatusMode::Healthy,
            commands: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/status", get(status_handle))
            .route("/api/set", get(set_handle))
            .route("/api/calibrate", get(calibrate_handle))
            .route("/api/servo", get(servo_handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{address}"),
            state,
        }
    }

    pub async fn set_mode(&self, mode: StatusMode) {
        self.state.lock().await.mode = mode;
    }

    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.commands.clone()
    }

    pub async fn status(&self) -> DeviceStatus {
        self.state.lock().await.status.clone()
    }
}

pub fn healthy_status() -> DeviceStatus {
    DeviceStatus {
        angle: Some(90),
        raw: Some(1800),
        cal: Some(37.2),
        min: Some(200),
        max: Some(3900),
        pulse: Some(1500),
        servo_min_us: Some(500),
        servo_max_us: Some(2500),
        servo_zero_us: Some(1400),
        wifi: Some(true),
        ip: Some("192.168.4.1".to_string()),
        clients: Some(1),
        calibrating: Some(false),
    }
}

async fn status_handle(State(state): State<SharedState>) -> Response {
    let state = state.lock().await;

    match state.mode {
        StatusMode::Healthy => Json(state.status.clone()).into_response(),
        StatusMode::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        StatusMode::Garbage => (StatusCode::OK, "{\"angle\": ").into_response(),
    }
}

async fn set_handle(
    State(state): State<SharedState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let mut state = state.lock().await;
    state.commands.push(uri.to_string());

    match params.get("angle").and_then(|angle| angle.parse::<i64>().ok()) {
        Some(angle) => {
            state.status.angle = Some(angle);
            StatusCode::OK
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn calibrate_handle(
    State(state): State<SharedState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let mut state = state.lock().await;
    state.commands.push(uri.to_string());

    match params.get("cmd").map(String::as_str) {
        Some("start") => state.status.calibrating = Some(true),
        Some("stop") | Some("reset") => state.status.calibrating = Some(false),
        _ => return StatusCode::BAD_REQUEST,
    }
    StatusCode::OK
}

async fn servo_handle(
    State(state): State<SharedState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let mut state = state.lock().await;
    state.commands.push(uri.to_string());

    let number = |key: &str| params.get(key).and_then(|v| v.parse::<i64>().ok());

    if let Some(pulse) = number("pulse") {
        state.status.pulse = Some(pulse);
        return StatusCode::OK;
    }

    match params.get("cmd").map(String::as_str) {
        Some("zero") => state.status.pulse = state.status.servo_zero_us,
        Some("save") => {
            state.status.servo_min_us = number("min");
            state.status.servo_max_us = number("max");
            state.status.servo_zero_us = number("zero");
        }
        Some("reset") => {
            state.status.servo_min_us = Some(500);
            state.status.servo_max_us = Some(2500);
            state.status.servo_zero_us = Some(1500);
        }
        _ => return StatusCode::BAD_REQUEST,
    }
    StatusCode::OK
}
