//! Ramps used to taper onsets and offsets.
//!
//! Pip templates get a raised-cosine (or linear) ramp inside their own duration; whole
//! traces get linear ramps at their extreme edges.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StimulusError};
use crate::synth::{pi_2, RangeBuffer};

/// Shape of the per-pip onset/offset ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampShape {
  Linear,
  Cos2,
}

impl RampShape {
  pub fn name(&self) -> &'static str {
    match self {
      RampShape::Linear => "linear",
      RampShape::Cos2 => "cos2",
    }
  }

  pub fn ramp(&self, n_points: usize) -> RangeBuffer {
    match self {
      RampShape::Linear => linspace(0.0, 1.0, n_points),
      RampShape::Cos2 => cosine_ramp(n_points),
    }
  }
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
  match n {
    0 => vec![],
    1 => vec![start],
    _ => {
      let step = (stop - start) / (n - 1) as f64;
      (0..n).map(|i| if i == n - 1 { stop } else { start + step * i as f64 }).collect()
    }
  }
}

/// `sin(linspace(0, π/2, n))²`, rising from 0 to 1.
pub fn cosine_ramp(n_points: usize) -> RangeBuffer {
  linspace(0.0, pi_2, n_points).iter().map(|x| x.sin().powi(2)).collect()
}

/// Number of ramp points for a ramp of `ramp_duration` seconds, `floor(ramp_duration * rate) + 1`.
pub fn ramp_points(ramp_duration: f64, rate: f64) -> usize {
  crate::time::samples_of_duration(ramp_duration, rate) + 1
}

/// Applies `shape` to the head of `pip` and its reverse to the tail.
pub fn apply_edge_ramps(pip: &mut [f64], n_points: usize, shape: RampShape) -> Result<()> {
  if n_points > pip.len() {
    return Err(StimulusError::invalid(
      "ramp_duration",
      format!("ramp of {} points does not fit in a {} point pip", n_points, pip.len()),
    ));
  }
  let ramp = shape.ramp(n_points);
  let n = pip.len();
  for (sample, gain) in pip[..n_points].iter_mut().zip(ramp.iter()) {
    *sample *= gain;
  }
  for (sample, gain) in pip[n - n_points..].iter_mut().zip(ramp.iter().rev()) {
    *sample *= gain;
  }
  Ok(())
}

/// Scales the first `ramp_points` samples by `linspace(0, 1)` and the `ramp_points`
/// samples ending at `end_index` (exclusive) by its reverse.
pub fn linear_ramp(signal: &[f64], end_index: usize, ramp_points: usize) -> Result<Vec<f64>> {
  if end_index > signal.len() || ramp_points > end_index {
    return Err(StimulusError::Generation(format!(
      "linear ramp of {} points ending at {} does not fit a {} sample signal",
      ramp_points,
      end_index,
      signal.len()
    )));
  }
  let mut out = signal.to_vec();
  let ramp = linspace(0.0, 1.0, ramp_points);
  for (sample, gain) in out[..ramp_points].iter_mut().zip(ramp.iter()) {
    *sample *= gain;
  }
  for (sample, gain) in out[end_index - ramp_points..end_index].iter_mut().zip(ramp.iter().rev()) {
    *sample *= gain;
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_linspace() {
    assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    assert!(linspace(0.0, 1.0, 0).is_empty());
  }

  #[test]
  fn cosine_ramp_rises_from_zero_to_one() {
    let ramp = cosine_ramp(11);
    assert_eq!(ramp.len(), 11);
    assert_eq!(ramp[0], 0.0);
    assert!((ramp[10] - 1.0).abs() < 1e-15);
    for i in 0..(ramp.len() - 1) {
      assert!(ramp[i] <= ramp[i + 1], "Values are not increasing: {:?}", ramp);
    }
    assert!((ramp[5] - 0.5).abs() < 1e-12);
  }

  #[test]
  fn edge_ramps_taper_both_ends() {
    let mut pip = vec![1.0; 20];
    apply_edge_ramps(&mut pip, 5, RampShape::Cos2).unwrap();
    assert_eq!(pip[0], 0.0);
    assert_eq!(pip[19], 0.0);
    assert!((pip[4] - 1.0).abs() < 1e-15);
    assert!((pip[15] - 1.0).abs() < 1e-15);
    assert_eq!(pip[10], 1.0);
  }

  #[test]
  fn edge_ramp_longer_than_pip_is_rejected() {
    let mut pip = vec![1.0; 3];
    assert!(apply_edge_ramps(&mut pip, 4, RampShape::Linear).is_err());
  }

  #[test]
  fn linear_ramp_tapers_head_and_tail_at_end_index() {
    let signal = vec![2.0; 10];
    let out = linear_ramp(&signal, 10, 3).unwrap();
    assert_eq!(&out[..3], &[0.0, 1.0, 2.0]);
    assert_eq!(&out[7..], &[2.0, 1.0, 0.0]);
    assert_eq!(out[5], 2.0);
  }

  #[test]
  fn linear_ramp_out_of_range_fails() {
    assert!(linear_ramp(&[1.0; 4], 5, 2).is_err());
    assert!(linear_ramp(&[1.0; 4], 4, 5).is_err());
  }

  #[test]
  fn ramp_points_matches_duration() {
    assert_eq!(ramp_points(0.001, 10000.0), 11);
    assert_eq!(ramp_points(0.0, 10000.0), 1);
  }
}
