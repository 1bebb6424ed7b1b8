use std::sync::Arc;
use std::time::Duration;

use servodeck_api::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

use crate::clamp::parse_pulse;
use crate::focus::FocusProbe;
use crate::state::SharedPanel;
use crate::surface::ElementId;
use crate::transport::{DeviceTransport, dispatch};

/// Trailing-edge debounce state for one control.
///
/// Every `arm` starts a new generation and supersedes whatever was pending.
/// A timer that wakes up reports its generation to `fire`; only the latest
/// generation turns pending into fired, older ones find nothing to send.
#[derive(Debug, Clone, Default)]
pub struct DebounceSlot<T> {
    generation: u64,
    pending: Option<T>,
}

impl<T: Copy> DebounceSlot<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }

    /// Arm with `value`. Returns the new generation and the value it cancelled.
    pub fn arm(&mut self, value: T) -> (u64, Option<T>) {
        self.generation += 1;
        (self.generation, self.pending.replace(value))
    }

    /// Pending to fired, if `generation` is still current.
    pub fn fire(&mut self, generation: u64) -> Option<T> {
        if generation != self.generation {
            return None;
        }
        self.pending.take()
    }

    /// Pending to cancelled. Timers already running become stale.
    pub fn cancel(&mut self) -> Option<T> {
        self.generation += 1;
        self.pending.take()
    }

    pub fn pending(&self) -> Option<T> {
        self.pending
    }
}

/// Which pulse input produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseSource {
    Slider,
    NumberField,
}

impl PulseSource {
    pub fn element(&self) -> ElementId {
        match self {
            PulseSource::Slider => ElementId::PulseRange,
            PulseSource::NumberField => ElementId::PulseInput,
        }
    }
}

struct Scheduled {
    slot: DebounceSlot<u16>,
    timer: Option<JoinHandle<()>>,
}

/// Turns a burst of pulse edits into a single `/api/servo?pulse=` request.
pub struct PulseDebouncer {
    panel: SharedPanel,
    transport: Arc<dyn DeviceTransport>,
    focus: Arc<dyn FocusProbe>,
    quiet: Duration,
    scheduled: Arc<Mutex<Scheduled>>,
}

impl PulseDebouncer {
    pub fn new(
        panel: SharedPanel,
        transport: Arc<dyn DeviceTransport>,
        focus: Arc<dyn FocusProbe>,
        quiet: Duration,
    ) -> Self {
        Self {
            panel,
            transport,
            focus,
            quiet,
            scheduled: Arc::new(Mutex::new(Scheduled {
                slot: DebounceSlot::new(),
                timer: None,
            })),
        }
    }

    /// Clamp `raw`, show it right away, and (re)schedule the send.
    ///
    /// Returns the clamped pulse.
    pub async fn submit_control_value(&self, source: PulseSource, raw: &str) -> u16 {
        let pulse = parse_pulse(raw);

        {
            let mut panel = self.panel.lock().await;
            let shown = match source {
                // A range input can only hold a value inside its bounds.
                PulseSource::Slider => pulse.to_string(),
                PulseSource::NumberField => raw.trim().to_string(),
            };
            panel.surface.set_value(source.element(), shown);
            panel.project_pulse(self.focus.as_ref(), pulse, Some(source.element()));
        }

        let mut scheduled = self.scheduled.lock().await;
        if let Some(timer) = scheduled.timer.take() {
            timer.abort();
        }

        let (generation, superseded) = scheduled.slot.arm(pulse);
        if let Some(previous) = superseded {
            trace!("Pulse {} superseded by {}", previous, pulse);
        }

        let shared = self.scheduled.clone();
        let transport = self.transport.clone();
        let quiet = self.quiet;
        scheduled.timer = Some(tokio::spawn(async move {
            sleep(quiet).await;

            let fired = shared.lock().await.slot.fire(generation);
            if let Some(pulse) = fired {
                dispatch(transport, Command::ServoPulse { pulse });
            }
        }));

        pulse
    }

    /// Value waiting for the quiet period to elapse, if any.
    pub async fn pending(&self) -> Option<u16> {
        self.scheduled.lock().await.slot.pending()
    }

    /// Drop the pending value without sending it.
    pub async fn cancel(&self) -> Option<u16> {
        let mut scheduled = self.scheduled.lock().await;
        if let Some(timer) = scheduled.timer.take() {
            timer.abort();
        }
        scheduled.slot.cancel()
    }
}
