use std::str::FromStr;
use std::sync::Arc;

use servodeck_api::CalibrateAction;
use time::format_description::well_known::Rfc3339;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::{info, warn};

use crate::configs::Settings;
use crate::control::{ControlPanel, ServoBound};
use crate::debouncer::PulseSource;
use crate::error::{Error, Result};
use crate::focus::{FocusCell, FocusProbe};
use crate::surface::{ElementId, Surface};

const HELP: &str = "\
commands:
  angle <deg>                  move the servo
  pulse <us> | pulse-input <us>  pulse slider / number field
  cal start|stop|reset         analog calibration
  set-min | set-max | set-zero copy the current pulse into a servo bound
  servo-min|servo-max|servo-zero <us>  type into a servo bound
  servo zero|save|reset        servo calibration
  focus <element> | blur       simulate input focus
  refresh | show | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoButton {
    Zero,
    Save,
    Reset,
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Angle(String),
    Pulse(PulseSource, String),
    Calibrate(CalibrateAction),
    Capture(ServoBound),
    EditBound(ServoBound, String),
    Servo(ServoButton),
    Focus(ElementId),
    Blur,
    Refresh,
    Show,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let arg = words.next();

        let required = |name: &str| {
            arg.map(str::to_string)
                .ok_or_else(|| Error::invalid_input(format!("'{name}' needs a value")))
        };

        let command = match verb {
            "angle" => ConsoleCommand::Angle(required("angle")?),
            "pulse" => ConsoleCommand::Pulse(PulseSource::Slider, required("pulse")?),
            "pulse-input" => {
                ConsoleCommand::Pulse(PulseSource::NumberField, required("pulse-input")?)
            }
            "cal" => ConsoleCommand::Calibrate(
                required("cal")?
                    .parse()
                    .map_err(Error::invalid_input)?,
            ),
            "set-min" => ConsoleCommand::Capture(ServoBound::Min),
            "set-max" => ConsoleCommand::Capture(ServoBound::Max),
            "set-zero" => ConsoleCommand::Capture(ServoBound::Zero),
            "servo-min" => ConsoleCommand::EditBound(ServoBound::Min, required("servo-min")?),
            "servo-max" => ConsoleCommand::EditBound(ServoBound::Max, required("servo-max")?),
            "servo-zero" => ConsoleCommand::EditBound(ServoBound::Zero, required("servo-zero")?),
            "servo" => match required("servo")?.as_str() {
                "zero" => ConsoleCommand::Servo(ServoButton::Zero),
                "save" => ConsoleCommand::Servo(ServoButton::Save),
                "reset" => ConsoleCommand::Servo(ServoButton::Reset),
                other => {
                    return Err(Error::invalid_input(format!("unknown servo command '{other}'")));
                }
            },
            "focus" => ConsoleCommand::Focus(required("focus")?.parse()?),
            "blur" => ConsoleCommand::Blur,
            "refresh" => ConsoleCommand::Refresh,
            "show" => ConsoleCommand::Show,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(Error::invalid_input(format!("unknown command '{other}'"))),
        };

        Ok(command)
    }
}

/// Run the console frontend until stdin closes or `quit` is entered.
pub async fn run(settings: &Settings) -> Result<()> {
    let focus = Arc::new(FocusCell::new());
    let control = ControlPanel::from_settings(settings, focus.clone())?;
    let polling = control.start_polling();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut report = interval(settings.timing.poll_interval());
    let mut shown = Surface::new();

    info!("Type 'help' for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => execute(&control, &focus, command).await,
                    Err(e) => warn!("{}", e),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            },
            _ = report.tick() => {
                let current = control.panel().lock().await.surface.clone();
                for id in current.changed_since(&shown) {
                    if let Some(element) = current.element(id) {
                        info!("{} = {}", id, element);
                    }
                }
                shown = current;
            }
        }
    }

    polling.abort();
    Ok(())
}

async fn execute(control: &ControlPanel, focus: &FocusCell, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Angle(raw) => {
            if let Err(e) = control.set_angle(&raw).await {
                warn!("{}", e);
            }
        }
        ConsoleCommand::Pulse(source, raw) => {
            control.submit_pulse(source, &raw).await;
        }
        ConsoleCommand::Calibrate(action) => control.calibrate(action),
        ConsoleCommand::Capture(bound) => {
            if !control.capture_servo_bound(bound).await {
                info!("{} has focus, left unchanged", bound.element());
            }
        }
        ConsoleCommand::EditBound(bound, raw) => control.edit_servo_bound(bound, &raw).await,
        ConsoleCommand::Servo(ServoButton::Zero) => control.zero_servo(),
        ConsoleCommand::Servo(ServoButton::Save) => {
            control.save_servo().await;
        }
        ConsoleCommand::Servo(ServoButton::Reset) => control.reset_servo(),
        ConsoleCommand::Focus(id) => focus.focus(id),
        ConsoleCommand::Blur => focus.blur(),
        ConsoleCommand::Refresh => {
            if let Err(e) = control.refresh().await {
                warn!("Status poll failed: {}", e);
            }
        }
        ConsoleCommand::Show => {
            let panel = control.panel().lock().await.clone();
            for (id, element) in panel.surface.snapshot() {
                let marker = if focus.is_focused(id) { "*" } else { " " };
                println!("{marker} {:<12} {}", id.as_str(), element);
            }
            let last_poll = panel
                .last_poll
                .and_then(|at| at.format(&Rfc3339).ok())
                .unwrap_or_else(|| "never".to_string());
            println!(
                "  angle {} deg, pulse {} us, last poll {}",
                panel.ui.angle, panel.ui.pulse, last_poll
            );
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
}
