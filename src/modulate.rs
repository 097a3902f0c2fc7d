//! Sinusoidal amplitude modulation.
//!
//! `envelope(t) = 1 + (depth / 100) * sin(2π * fmod * (t - t_start) + phase_shift - π/2)`
//!
//! Depth is in percent: 0 gives a unity envelope, 100 swings it over [0, 2]. The
//! `-π/2` term starts every envelope at its minimum when `t = t_start`, and the
//! unit mean keeps the energy the same at every depth (Rhode & Greenberg 1994,
//! Sayles et al. 2013).

use crate::error::{Result, StimulusError};
use crate::synth::{pi2, pi_2, RangeBuffer, SampleBuffer};

/// Modulation envelope sampled at `times`.
pub fn sam_envelope(times: &[f64], t_start: f64, fmod: f64, dmod: f64, phase_shift: f64) -> RangeBuffer {
  let depth = dmod / 100.0;
  times.iter().map(|&t| 1.0 + depth * (pi2 * fmod * (t - t_start) + phase_shift - pi_2).sin()).collect()
}

/// Multiplies `signal` by the modulation envelope.
pub fn sinusoidal_modulation(
  times: &[f64], signal: &[f64], t_start: f64, fmod: f64, dmod: f64, phase_shift: f64,
) -> Result<SampleBuffer> {
  if times.len() != signal.len() {
    return Err(StimulusError::Generation(format!(
      "modulation time base has {} samples but the signal has {}",
      times.len(),
      signal.len()
    )));
  }
  let envelope = sam_envelope(times, t_start, fmod, dmod, phase_shift);
  Ok(signal.iter().zip(envelope.iter()).map(|(s, e)| s * e).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::time::TimeBase;

  #[test]
  fn zero_depth_is_identity() {
    let tb = TimeBase::new(1000.0, 0.5);
    let env = sam_envelope(tb.times(), 0.1, 40.0, 0.0, 1.3);
    assert!(env.iter().all(|&e| e == 1.0));
  }

  #[test]
  fn full_depth_spans_zero_to_two() {
    let tb = TimeBase::new(10000.0, 1.0);
    let env = sam_envelope(tb.times(), 0.0, 10.0, 100.0, 0.0);
    let min = env.iter().cloned().fold(f64::MAX, f64::min);
    let max = env.iter().cloned().fold(f64::MIN, f64::max);
    assert!(min.abs() < 1e-9);
    assert!((max - 2.0).abs() < 1e-9);
    // starts at the trough
    assert!(env[0].abs() < 1e-12);
  }

  #[test]
  fn phase_shift_of_pi_inverts_the_envelope() {
    let tb = TimeBase::new(1000.0, 0.2);
    let a = sam_envelope(tb.times(), 0.0, 10.0, 50.0, 0.0);
    let b = sam_envelope(tb.times(), 0.0, 10.0, 50.0, std::f64::consts::PI);
    for (x, y) in a.iter().zip(b.iter()) {
      assert!((x + y - 2.0).abs() < 1e-12);
    }
  }

  #[test]
  fn length_mismatch_is_reported() {
    assert!(sinusoidal_modulation(&[0.0, 0.1], &[1.0], 0.0, 1.0, 10.0, 0.0).is_err());
  }
}
