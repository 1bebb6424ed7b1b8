use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status resource polled by the client.
pub const STATUS_PATH: &str = "/api/status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrateAction {
    /// Clear the recorded range and start tracking min/max
    Start,
    /// Stop tracking and persist the recorded range
    Stop,
    /// Clear and persist an empty range
    Reset,
}

impl CalibrateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrateAction::Start => "start",
            CalibrateAction::Stop => "stop",
            CalibrateAction::Reset => "reset",
        }
    }
}

impl FromStr for CalibrateAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "start" => Ok(CalibrateAction::Start),
            "stop" => Ok(CalibrateAction::Stop),
            "reset" => Ok(CalibrateAction::Reset),
            other => Err(format!("unknown calibration command '{other}'")),
        }
    }
}

impl fmt::Display for CalibrateAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoAction {
    /// Drive the servo to its stored zero pulse
    Zero,
    /// Persist new servo bounds; values are pulse widths in microseconds
    Save { min: u16, max: u16, zero: u16 },
    /// Restore factory servo bounds
    Reset,
}

impl ServoAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServoAction::Zero => "zero",
            ServoAction::Save { .. } => "save",
            ServoAction::Reset => "reset",
        }
    }
}

/// Fire-and-forget request understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Move the servo to an angle in degrees
    SetAngle { angle: i64 },
    /// Control the analog calibration routine
    Calibrate(CalibrateAction),
    /// Drive a raw pulse width in microseconds
    ServoPulse { pulse: u16 },
    /// Servo calibration management
    Servo(ServoAction),
}

impl Command {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Command::SetAngle { .. } => "/api/set",
            Command::Calibrate(_) => "/api/calibrate",
            Command::ServoPulse { .. } | Command::Servo(_) => "/api/servo",
        }
    }

    /// Query parameters in the order the device documents them.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Command::SetAngle { angle } => vec![("angle", angle.to_string())],
            Command::Calibrate(action) => vec![("cmd", action.as_str().to_string())],
            Command::ServoPulse { pulse } => vec![("pulse", pulse.to_string())],
            Command::Servo(ServoAction::Save { min, max, zero }) => vec![
                ("cmd", "save".to_string()),
                ("min", min.to_string()),
                ("max", max.to_string()),
                ("zero", zero.to_string()),
            ],
            Command::Servo(action) => vec![("cmd", action.as_str().to_string())],
        }
    }

    pub fn path_and_query(&self) -> String {
        let query = self
            .query()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.endpoint(), query)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path_and_query())
    }
}
