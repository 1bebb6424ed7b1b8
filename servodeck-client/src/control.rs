use std::sync::{Arc, Mutex};

use servodeck_api::{CalibrateAction, Command, ServoAction};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, warn};

use crate::clamp::{numeric_input, parse_pulse};
use crate::configs::{Settings, Timing};
use crate::debouncer::{PulseDebouncer, PulseSource};
use crate::error::{Error, Result};
use crate::focus::{FocusProbe, write_if_not_focused};
use crate::state::{Panel, SharedPanel};
use crate::surface::ElementId;
use crate::synchronizer::StatusSynchronizer;
use crate::transport::{DeviceTransport, HttpTransport, dispatch};

/// One of the three stored servo bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoBound {
    Min,
    Max,
    Zero,
}

impl ServoBound {
    pub fn element(&self) -> ElementId {
        match self {
            ServoBound::Min => ElementId::ServoMin,
            ServoBound::Max => ElementId::ServoMax,
            ServoBound::Zero => ElementId::ServoZero,
        }
    }
}

/// Everything a frontend needs to drive the device.
///
/// Dropping the panel stops its polling loop.
pub struct ControlPanel {
    panel: SharedPanel,
    transport: Arc<dyn DeviceTransport>,
    focus: Arc<dyn FocusProbe>,
    synchronizer: Arc<StatusSynchronizer>,
    debouncer: PulseDebouncer,
    polling: Mutex<Vec<AbortHandle>>,
}

impl ControlPanel {
    pub fn new(
        transport: Arc<dyn DeviceTransport>,
        focus: Arc<dyn FocusProbe>,
        timing: &Timing,
    ) -> Self {
        let panel = Panel::shared();

        let synchronizer = Arc::new(StatusSynchronizer::new(
            panel.clone(),
            transport.clone(),
            focus.clone(),
            timing.poll_interval(),
        ));
        let debouncer = PulseDebouncer::new(
            panel.clone(),
            transport.clone(),
            focus.clone(),
            timing.debounce(),
        );

        Self {
            panel,
            transport,
            focus,
            synchronizer,
            debouncer,
            polling: Mutex::new(Vec::new()),
        }
    }

    /// Build a panel talking HTTP to the configured device.
    pub fn from_settings(settings: &Settings, focus: Arc<dyn FocusProbe>) -> Result<Self> {
        let transport = HttpTransport::new(&settings.device)?;
        info!("Controlling device at {}", transport.base_url());

        Ok(Self::new(Arc::new(transport), focus, &settings.timing))
    }

    pub fn panel(&self) -> SharedPanel {
        self.panel.clone()
    }

    /// Poll the status once, right now.
    pub async fn refresh(&self) -> Result<()> {
        self.synchronizer.poll().await
    }

    /// Start the periodic status poll. It stops when the handle is aborted
    /// or the panel is dropped.
    pub fn start_polling(&self) -> JoinHandle<()> {
        let handle = self.synchronizer.clone().spawn();
        if let Ok(mut polling) = self.polling.lock() {
            polling.push(handle.abort_handle());
        }
        handle
    }

    /// Angle slider input: show it and send it immediately.
    pub async fn set_angle(&self, raw: &str) -> Result<i64> {
        let value = numeric_input(raw);
        if !value.is_finite() {
            warn!("Ignoring angle input '{}'", raw);
            return Err(Error::invalid_input(format!("angle '{}' is not a number", raw)));
        }
        let angle = value.round() as i64;

        {
            let mut panel = self.panel.lock().await;
            panel.ui.angle = angle;
            panel.surface.set_value(ElementId::Angle, raw.trim());
            panel
                .surface
                .set_text(ElementId::AngleVal, format!("{} deg", angle));
        }

        dispatch(self.transport.clone(), Command::SetAngle { angle });
        Ok(angle)
    }

    /// Pulse slider or number field input, debounced.
    pub async fn submit_pulse(&self, source: PulseSource, raw: &str) -> u16 {
        self.debouncer.submit_control_value(source, raw).await
    }

    pub fn calibrate(&self, action: CalibrateAction) {
        dispatch(self.transport.clone(), Command::Calibrate(action));
    }

    /// Copy the current pulse into a servo bound field, unless it is focused.
    pub async fn capture_servo_bound(&self, bound: ServoBound) -> bool {
        let mut panel = self.panel.lock().await;
        let pulse = panel.ui.pulse;

        write_if_not_focused(
            &mut panel.surface,
            self.focus.as_ref(),
            bound.element(),
            pulse.to_string(),
        )
    }

    /// The user typed into a servo bound field.
    pub async fn edit_servo_bound(&self, bound: ServoBound, raw: &str) {
        self.panel
            .lock()
            .await
            .surface
            .set_value(bound.element(), raw.trim());
    }

    pub fn zero_servo(&self) {
        dispatch(self.transport.clone(), Command::Servo(ServoAction::Zero));
    }

    /// Send the three bound fields, each clamped on its own.
    pub async fn save_servo(&self) -> ServoAction {
        let action = {
            let panel = self.panel.lock().await;
            let bound = |b: ServoBound| parse_pulse(panel.surface.value(b.element()).unwrap_or_default());

            ServoAction::Save {
                min: bound(ServoBound::Min),
                max: bound(ServoBound::Max),
                zero: bound(ServoBound::Zero),
            }
        };

        dispatch(self.transport.clone(), Command::Servo(action));
        action
    }

    pub fn reset_servo(&self) {
        dispatch(self.transport.clone(), Command::Servo(ServoAction::Reset));
    }

    /// Drop a pulse change that has not been sent yet.
    pub async fn discard_pending_pulse(&self) -> Option<u16> {
        self.debouncer.cancel().await
    }
}

impl Drop for ControlPanel {
    fn drop(&mut self) {
        if let Ok(polling) = self.polling.get_mut() {
            for handle in polling.drain(..) {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use servodeck_api::DeviceStatus;
    use tokio::time::sleep;

    use super::*;
    use crate::focus::FocusCell;
    use crate::transport::RecordingTransport;

    fn control(status: DeviceStatus) -> (Arc<RecordingTransport>, Arc<FocusCell>, ControlPanel) {
        let transport = Arc::new(RecordingTransport::new(status));
        let focus = Arc::new(FocusCell::new());
        let control = ControlPanel::new(transport.clone(), focus.clone(), &Timing::default());
        (transport, focus, control)
    }

    #[tokio::test]
    async fn test_angle_is_sent_without_debounce() {
        let (transport, _focus, control) = control(DeviceStatus::default());

        assert_eq!(control.set_angle("120").await.unwrap(), 120);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(control.set_angle("120.6").await.unwrap(), 121);
        sleep(Duration::from_millis(1)).await;

        assert_eq!(
            transport.sent().await,
            vec![
                Command::SetAngle { angle: 120 },
                Command::SetAngle { angle: 121 }
            ]
        );
        let panel = control.panel();
        let panel = panel.lock().await;
        assert_eq!(panel.ui.angle, 121);
        assert_eq!(panel.surface.text(ElementId::AngleVal), Some("121 deg"));
    }

    #[tokio::test]
    async fn test_invalid_angle_is_rejected() {
        let (transport, _focus, control) = control(DeviceStatus::default());

        assert!(matches!(
            control.set_angle("left").await,
            Err(Error::InvalidInput { .. })
        ));
        sleep(Duration::from_millis(1)).await;

        assert!(transport.sent().await.is_empty());
        assert_eq!(control.panel().lock().await.ui.angle, 90);
    }

    #[tokio::test]
    async fn test_button_commands() {
        let (transport, _focus, control) = control(DeviceStatus::default());

        control.calibrate(CalibrateAction::Start);
        sleep(Duration::from_millis(1)).await;
        control.calibrate(CalibrateAction::Stop);
        sleep(Duration::from_millis(1)).await;
        control.zero_servo();
        sleep(Duration::from_millis(1)).await;
        control.reset_servo();
        sleep(Duration::from_millis(1)).await;

        assert_eq!(
            transport.sent().await,
            vec![
                Command::Calibrate(CalibrateAction::Start),
                Command::Calibrate(CalibrateAction::Stop),
                Command::Servo(ServoAction::Zero),
                Command::Servo(ServoAction::Reset),
            ]
        );
    }

    #[tokio::test]
    async fn test_capture_bound_copies_current_pulse() {
        let (_transport, focus, control) = control(DeviceStatus::default());
        control.panel().lock().await.ui.pulse = 1720;

        assert!(control.capture_servo_bound(ServoBound::Min).await);
        focus.focus(ElementId::ServoMax);
        assert!(!control.capture_servo_bound(ServoBound::Max).await);

        let panel = control.panel();
        let panel = panel.lock().await;
        assert_eq!(panel.surface.value(ElementId::ServoMin), Some("1720"));
        assert_eq!(panel.surface.value(ElementId::ServoMax), None);
    }

    #[tokio::test]
    async fn test_save_clamps_each_bound() {
        let (transport, _focus, control) = control(DeviceStatus::default());
        control.edit_servo_bound(ServoBound::Min, "100").await;
        control.edit_servo_bound(ServoBound::Max, "9999").await;
        control.edit_servo_bound(ServoBound::Zero, "oops").await;

        let action = control.save_servo().await;
        sleep(Duration::from_millis(1)).await;

        let expected = ServoAction::Save {
            min: 300,
            max: 3000,
            zero: 1500,
        };
        assert_eq!(action, expected);
        assert_eq!(transport.sent().await, vec![Command::Servo(expected)]);
    }

    #[tokio::test]
    async fn test_refresh_reconciles_predicted_pulse() {
        let (_transport, _focus, control) = control(DeviceStatus {
            pulse: Some(1500),
            wifi: Some(true),
            ..Default::default()
        });

        control.submit_pulse(PulseSource::Slider, "2400").await;
        assert_eq!(control.panel().lock().await.ui.pulse, 2400);

        // A zero command moved the servo back; the device wins once the slider is released.
        control.refresh().await.unwrap();

        let panel = control.panel();
        let panel = panel.lock().await;
        assert_eq!(panel.ui.pulse, 1500);
        assert_eq!(panel.surface.value(ElementId::PulseRange), Some("1500"));
        assert_eq!(panel.surface.text(ElementId::PulseVal), Some("1500 us"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_poll_cannot_clobber_focused_slider() {
        let (transport, focus, control) = control(DeviceStatus {
            pulse: Some(1500),
            ..Default::default()
        });
        let polling = control.start_polling();
        sleep(Duration::from_millis(10)).await;

        focus.focus(ElementId::PulseRange);
        control.submit_pulse(PulseSource::Slider, "2600").await;
        sleep(Duration::from_millis(800)).await;

        {
            let panel = control.panel();
            let panel = panel.lock().await;
            assert_eq!(panel.surface.value(ElementId::PulseRange), Some("2600"));
            // The readout follows the device until the device catches up.
            assert_eq!(panel.surface.text(ElementId::PulseVal), Some("1500 us"));
        }
        assert_eq!(
            transport.sent().await,
            vec![Command::ServoPulse { pulse: 2600 }]
        );

        polling.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_panel_stops_polling() {
        let (transport, _focus, control) = control(DeviceStatus::default());

        let polling = control.start_polling();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.polls(), 1);

        drop(polling);
        drop(control);
        sleep(Duration::from_millis(2100)).await;

        assert_eq!(transport.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborting_handle_stops_polling() {
        let (transport, _focus, control) = control(DeviceStatus::default());

        let polling = control.start_polling();
        sleep(Duration::from_millis(10)).await;
        polling.abort();
        sleep(Duration::from_millis(2100)).await;

        assert_eq!(transport.polls(), 1);
    }

    #[tokio::test]
    async fn test_discard_pending_pulse() {
        let (_transport, _focus, control) = control(DeviceStatus::default());

        control.submit_pulse(PulseSource::NumberField, "1900").await;

        assert_eq!(control.discard_pending_pulse().await, Some(1900));
        assert_eq!(control.discard_pending_pulse().await, None);
    }
}
