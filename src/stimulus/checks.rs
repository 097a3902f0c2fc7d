//! Constraint checks shared by the variants. Each failure names the offending parameter.

use crate::envelope::ramp_points;
use crate::error::{Result, StimulusError};
use crate::sequence::check_placement;
use crate::time::samples_of_duration;

pub fn positive(name: &str, value: f64) -> Result<()> {
  if !(value.is_finite() && value > 0.0) {
    return Err(StimulusError::invalid(name, format!("must be a positive number, got {}", value)));
  }
  Ok(())
}

pub fn non_negative(name: &str, value: f64) -> Result<()> {
  if !(value.is_finite() && value >= 0.0) {
    return Err(StimulusError::invalid(name, format!("must be zero or positive, got {}", value)));
  }
  Ok(())
}

/// `0 < freq < rate / 2`.
pub fn below_nyquist(name: &str, freq: f64, rate: f64) -> Result<()> {
  positive(name, freq)?;
  if freq >= rate / 2.0 {
    return Err(StimulusError::invalid(
      name,
      format!("{} Hz must be less than rate / 2 ({} Hz)", freq, rate / 2.0),
    ));
  }
  Ok(())
}

/// A sample rate and a total duration that give at least one sample.
pub fn timing(rate: f64, duration: f64) -> Result<()> {
  positive("rate", rate)?;
  positive("duration", duration)?;
  if samples_of_duration(duration, rate) == 0 {
    return Err(StimulusError::invalid(
      "duration",
      format!("{}s at {} Hz does not cover a single sample", duration, rate),
    ));
  }
  Ok(())
}

/// Modulation frequency and depth in percent.
pub fn modulation(fmod: f64, dmod: f64) -> Result<()> {
  positive("fmod", fmod)?;
  if !(0.0..=100.0).contains(&dmod) {
    return Err(StimulusError::invalid("dmod", format!("depth must be within [0, 100] percent, got {}", dmod)));
  }
  Ok(())
}

/// Per-pip ramp and placement constraints of a pip train.
pub fn pip_train(
  name: &str, rate: f64, duration: f64, pip_duration: f64, ramp_duration: f64, starts: &[f64],
) -> Result<()> {
  positive("pip_duration", pip_duration)?;
  non_negative("ramp_duration", ramp_duration)?;
  if pip_duration < 2.0 * ramp_duration {
    return Err(StimulusError::invalid(
      "pip_duration",
      format!("{}s must be at least 2 * ramp_duration ({}s)", pip_duration, 2.0 * ramp_duration),
    ));
  }
  let template_len = samples_of_duration(pip_duration, rate);
  let n_ramp = ramp_points(ramp_duration, rate);
  if template_len < n_ramp {
    return Err(StimulusError::invalid(
      "pip_duration",
      format!("{} samples cannot hold a {} point ramp at {} Hz", template_len, n_ramp, rate),
    ));
  }
  if starts.is_empty() {
    return Err(StimulusError::invalid(name, "must list at least one start time"));
  }
  check_placement(name, starts, template_len, rate, duration)
}
