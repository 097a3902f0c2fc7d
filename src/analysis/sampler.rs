use log::debug;
use rubato::{FftFixedInOut, Resampler};

use crate::error::{Result, StimulusError};

/// Preferred input block for the FFT resampler; rubato rounds it to fit the rate ratio.
const CHUNK_FRAMES: usize = 1024;

/// Resamples a mono signal from `from_rate` to `to_rate` Hz.
///
/// The output has `round(len * to_rate / from_rate)` samples with the resampler's
/// group delay removed.
pub fn resample(samples: &[f64], from_rate: usize, to_rate: usize) -> Result<Vec<f64>> {
  if from_rate == 0 || to_rate == 0 {
    return Err(StimulusError::invalid(
      "samplingrate",
      format!("sample rates must be positive (from {} to {})", from_rate, to_rate),
    ));
  }
  if from_rate == to_rate || samples.is_empty() {
    return Ok(samples.to_vec());
  }

  let mut resampler = FftFixedInOut::<f64>::new(from_rate, to_rate, CHUNK_FRAMES, 1)
    .map_err(|e| StimulusError::Generation(format!("could not build resampler {} -> {}: {}", from_rate, to_rate, e)))?;

  let chunk = resampler.input_frames_next();
  let delay = resampler.output_delay();
  let expected = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
  debug!("resampling {} samples from {} Hz to {} Hz in blocks of {}", samples.len(), from_rate, to_rate, chunk);

  let mut output: Vec<f64> = Vec::with_capacity(expected + delay + chunk);
  let mut position = 0;
  // keep feeding zeros past the end until the delayed tail has been flushed
  while output.len() < expected + delay {
    let mut block = vec![0f64; chunk];
    if position < samples.len() {
      let end = (position + chunk).min(samples.len());
      block[..end - position].copy_from_slice(&samples[position..end]);
    }
    position += chunk;
    let frames = resampler
      .process(&[block], None)
      .map_err(|e| StimulusError::Generation(format!("resampling failed: {}", e)))?;
    output.extend_from_slice(&frames[0]);
  }

  Ok(output[delay..delay + expected].to_vec())
}
