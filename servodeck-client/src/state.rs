use std::sync::Arc;

use servodeck_api::{ANGLE_DEFAULT, PULSE_DEFAULT_US};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::focus::{FocusProbe, write_if_not_focused};
use crate::surface::{ElementId, Surface};

/// Last known or intended servo position, owned by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    /// Angle in degrees
    pub angle: i64,
    /// Pulse width in microseconds, always within the servo range
    pub pulse: u16,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            angle: ANGLE_DEFAULT,
            pulse: PULSE_DEFAULT_US,
        }
    }
}

/// UI state together with the surface it is projected onto.
#[derive(Debug, Clone)]
pub struct Panel {
    pub ui: UiState,
    pub surface: Surface,
    /// Completion time of the last successful status poll
    pub last_poll: Option<OffsetDateTime>,
}

pub type SharedPanel = Arc<Mutex<Panel>>;

impl Panel {
    pub fn new() -> Self {
        let ui = UiState::default();
        let mut surface = Surface::new();

        surface.set_value(ElementId::Angle, ui.angle.to_string());
        surface.set_text(ElementId::AngleVal, format!("{} deg", ui.angle));
        surface.set_text(ElementId::PulseVal, format!("{} us", ui.pulse));
        surface.set_value(ElementId::PulseRange, ui.pulse.to_string());
        surface.set_value(ElementId::PulseInput, ui.pulse.to_string());
        surface.set_text(ElementId::Wifi, "WiFi: OFF");

        Self {
            ui,
            surface,
            last_poll: None,
        }
    }

    pub fn shared() -> SharedPanel {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Record a clamped pulse and refresh its readout and both pulse inputs.
    ///
    /// `source` is the input that produced the value; it already shows the
    /// user's edit and is left alone. The other input is focus-guarded.
    pub fn project_pulse(&mut self, focus: &dyn FocusProbe, pulse: u16, source: Option<ElementId>) {
        self.ui.pulse = pulse;
        self.surface
            .set_text(ElementId::PulseVal, format!("{} us", pulse));

        for id in [ElementId::PulseRange, ElementId::PulseInput] {
            if Some(id) != source {
                write_if_not_focused(&mut self.surface, focus, id, pulse.to_string());
            }
        }
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}
