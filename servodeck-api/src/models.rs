use serde::{Deserialize, Serialize};

/// Lowest pulse width the servo output accepts, in microseconds.
pub const PULSE_MIN_US: u16 = 300;
/// Highest pulse width the servo output accepts, in microseconds.
pub const PULSE_MAX_US: u16 = 3000;
/// Pulse width used before the first status arrives and for unreadable input.
pub const PULSE_DEFAULT_US: u16 = 1500;
/// Servo angle used before the first status arrives.
pub const ANGLE_DEFAULT: i64 = 90;

/// Snapshot returned by `GET /api/status`.
///
/// Every field is optional on the wire. A device running older firmware omits
/// the servo calibration keys, and the client renders whatever it receives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatus {
    /// Servo angle in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<i64>,
    /// Averaged analog reading in ADC counts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<i64>,
    /// Calibrated reading as a percentage of the recorded range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cal: Option<f64>,
    /// Lowest reading seen during calibration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Highest reading seen during calibration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Pulse width currently driven on the servo pin, in microseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servo_min_us: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servo_max_us: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servo_zero_us: Option<i64>,
    /// Whether the radio is up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Stations associated with the soft access point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibrating: Option<bool>,
}
