use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use servodeck_api::DeviceStatus;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::clamp::{clamp_pulse, clamped_fill};
use crate::error::Result;
use crate::focus::{FocusProbe, write_if_not_focused};
use crate::state::{Panel, SharedPanel};
use crate::surface::ElementId;
use crate::transport::DeviceTransport;

/// Rendered in place of a field the device did not report.
pub const MISSING: &str = "undefined";

/// Periodically pulls the device status and projects it onto the panel.
pub struct StatusSynchronizer {
    panel: SharedPanel,
    transport: Arc<dyn DeviceTransport>,
    focus: Arc<dyn FocusProbe>,
    interval: Duration,
}

impl StatusSynchronizer {
    pub fn new(
        panel: SharedPanel,
        transport: Arc<dyn DeviceTransport>,
        focus: Arc<dyn FocusProbe>,
        interval: Duration,
    ) -> Self {
        Self {
            panel,
            transport,
            focus,
            interval,
        }
    }

    /// Fetch one snapshot and apply it. On failure only the WiFi indicator
    /// changes; the error is returned for logging.
    pub async fn poll(&self) -> Result<()> {
        // The lock is only taken once the response is in.
        match self.transport.fetch_status().await {
            Ok(status) => {
                let mut panel = self.panel.lock().await;
                apply_status(&mut panel, self.focus.as_ref(), &status);
                Ok(())
            }
            Err(e) => {
                let mut panel = self.panel.lock().await;
                apply_failure(&mut panel);
                Err(e)
            }
        }
    }

    /// Poll forever. The first poll happens immediately.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.poll().await {
                warn!("Status poll failed: {}", e);
            }
        }
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

fn show<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => MISSING.to_string(),
    }
}

/// Project a status snapshot onto the panel.
///
/// Editable elements are focus-guarded. Fields the device left out are shown
/// as [`MISSING`] in labels and leave inputs untouched.
pub fn apply_status(panel: &mut Panel, focus: &dyn FocusProbe, status: &DeviceStatus) {
    let surface = &mut panel.surface;

    if let Some(angle) = status.angle {
        panel.ui.angle = angle;
        write_if_not_focused(surface, focus, ElementId::Angle, angle.to_string());
    }
    surface.set_text(ElementId::AngleVal, format!("{} deg", show(&status.angle)));
    surface.set_text(ElementId::Raw, format!("raw: {}", show(&status.raw)));

    let cal = match status.cal {
        Some(cal) => format!("cal: {:.1}%", cal),
        None => format!("cal: {}%", MISSING),
    };
    surface.set_text(ElementId::Cal, cal);

    surface.set_text(ElementId::Min, show(&status.min));
    surface.set_text(ElementId::Max, show(&status.max));
    surface.set_text(
        ElementId::Range,
        format!("min: {} | max: {}", show(&status.min), show(&status.max)),
    );
    surface.set_text(ElementId::Pulse, format!("pulse: {} us", show(&status.pulse)));
    surface.set_text(ElementId::Wifi, wifi_label(status.wifi.unwrap_or(false)));
    surface.set_text(ElementId::Ip, format!("IP: {}", show(&status.ip)));
    surface.set_text(ElementId::Clients, format!("Clients: {}", show(&status.clients)));

    for (id, value) in [
        (ElementId::ServoMin, status.servo_min_us),
        (ElementId::ServoMax, status.servo_max_us),
        (ElementId::ServoZero, status.servo_zero_us),
    ] {
        if let Some(value) = value {
            write_if_not_focused(surface, focus, id, value.to_string());
        }
    }
    surface.set_text(
        ElementId::ServoRange,
        format!(
            "range: {}-{}",
            show(&status.servo_min_us),
            show(&status.servo_max_us)
        ),
    );

    if let Some(cal) = status.cal {
        surface.set_width(ElementId::CalFill, clamped_fill(cal));
    }

    let (state, notice) = if status.calibrating.unwrap_or(false) {
        ("Calibrating", "Calibration running")
    } else {
        ("Idle", "Calibration idle")
    };
    surface.set_text(ElementId::CalState, state);
    surface.set_text(ElementId::NoticeText, notice);

    // The device is authoritative for the pulse, e.g. after a zero command.
    if let Some(pulse) = status.pulse {
        panel.project_pulse(focus, clamp_pulse(pulse as f64), None);
    }

    panel.last_poll = Some(OffsetDateTime::now_utc());
    debug!(
        "Applied status: angle {:?}, pulse {:?}, calibrating {:?}",
        status.angle, status.pulse, status.calibrating
    );
}

/// Recovery for a failed poll: the device is considered offline, nothing else changes.
pub fn apply_failure(panel: &mut Panel) {
    panel.surface.set_text(ElementId::Wifi, wifi_label(false));
}

fn wifi_label(on: bool) -> &'static str {
    if on { "WiFi: ON" } else { "WiFi: OFF" }
}
