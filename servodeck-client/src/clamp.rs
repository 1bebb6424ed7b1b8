use servodeck_api::{PULSE_DEFAULT_US, PULSE_MAX_US, PULSE_MIN_US};

/// Round to the nearest microsecond and clamp into the servo range.
/// NaN maps to the default pulse.
pub fn clamp_pulse(value: f64) -> u16 {
    if value.is_nan() {
        return PULSE_DEFAULT_US;
    }

    value
        .round()
        .clamp(f64::from(PULSE_MIN_US), f64::from(PULSE_MAX_US)) as u16
}

/// Clamp free-form user input. Blank input reads as zero, unparsable input as NaN.
pub fn parse_pulse(raw: &str) -> u16 {
    clamp_pulse(numeric_input(raw))
}

/// Width of the calibration progress bar, always within `0..=100`.
pub fn clamped_fill(cal: f64) -> f64 {
    if cal.is_nan() {
        return 0.0;
    }
    cal.clamp(0.0, 100.0)
}

pub(crate) fn numeric_input(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
