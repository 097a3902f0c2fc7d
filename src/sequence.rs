//! Placement of short templates inside a full-length trace.

use crate::error::{Result, StimulusError};
use crate::synth::SampleBuffer;
use crate::time::{samples_of_duration, seconds_to_index};

/// Checks that a template of `template_len` samples fits at every start.
///
/// `name` is the parameter the starts came from, so the error can point at it.
pub fn check_placement(
  name: &str, starts: &[f64], template_len: usize, rate: f64, duration: f64,
) -> Result<()> {
  let buffer_len = samples_of_duration(duration, rate);
  for &start in starts {
    let index = seconds_to_index(start, rate);
    if index < 0 || index as usize + template_len > buffer_len {
      return Err(StimulusError::Boundary {
        name: name.to_string(),
        start,
        length: template_len as f64 / rate,
        duration,
      });
    }
  }
  Ok(())
}

/// Allocates a zeroed buffer of `floor(duration * rate)` samples and adds `template`
/// at `floor(start * rate)` for every start. Overlapping templates sum.
pub fn place_pips(
  name: &str, template: &[f64], starts: &[f64], rate: f64, duration: f64,
) -> Result<SampleBuffer> {
  check_placement(name, starts, template.len(), rate, duration)?;
  let mut buffer = vec![0f64; samples_of_duration(duration, rate)];
  for &start in starts {
    let index = seconds_to_index(start, rate) as usize;
    for (out, sample) in buffer[index..index + template.len()].iter_mut().zip(template.iter()) {
      *out += sample;
    }
  }
  Ok(buffer)
}

/// Sums equal-length buffers in the order given.
pub fn sum_buffers(buffers: &[SampleBuffer], len: usize) -> Result<SampleBuffer> {
  let mut total = vec![0f64; len];
  for (i, buffer) in buffers.iter().enumerate() {
    if buffer.len() != len {
      return Err(StimulusError::Generation(format!(
        "buffer {} has {} samples, expected {}",
        i,
        buffer.len(),
        len
      )));
    }
    total.iter_mut().zip(buffer.iter()).for_each(|(t, s)| *t += s);
  }
  Ok(total)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pips_land_at_floor_of_start_times_rate() {
    let template = vec![1.0, 2.0, 3.0];
    let buffer = place_pips("pip_starts", &template, &[0.0, 0.005], 1000.0, 0.01).unwrap();
    assert_eq!(buffer.len(), 10);
    assert_eq!(buffer, vec![1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0]);
  }

  #[test]
  fn overlapping_pips_sum() {
    let template = vec![1.0; 4];
    let buffer = place_pips("pip_starts", &template, &[0.0, 0.002], 1000.0, 0.008).unwrap();
    assert_eq!(buffer, vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 0.0, 0.0]);
  }

  #[test]
  fn template_ending_exactly_at_buffer_end_fits() {
    let buffer = place_pips("pip_starts", &[1.0; 5], &[0.005], 1000.0, 0.01).unwrap();
    assert_eq!(buffer[9], 1.0);
  }

  #[test]
  fn overrun_names_start_and_duration() {
    let err = place_pips("click_starts", &[1.0; 5], &[0.006], 1000.0, 0.01).unwrap_err();
    match err {
      StimulusError::Boundary { name, start, duration, .. } => {
        assert_eq!(name, "click_starts");
        assert_eq!(start, 0.006);
        assert_eq!(duration, 0.01);
      }
      other => panic!("expected a boundary error, got {:?}", other),
    }
  }

  #[test]
  fn negative_start_is_a_boundary_error() {
    assert!(matches!(
      check_placement("pip_starts", &[-0.001], 1, 1000.0, 0.01),
      Err(StimulusError::Boundary { .. })
    ));
  }

  #[test]
  fn sum_keeps_order_and_checks_length() {
    let total = sum_buffers(&[vec![1.0, 2.0], vec![0.5, 0.5]], 2).unwrap();
    assert_eq!(total, vec![1.5, 2.5]);
    assert!(sum_buffers(&[vec![1.0]], 2).is_err());
  }
}
