use std::path::Path;

use log::info;

use crate::error::{Result, StimulusError};
use crate::files;

/// Writes mono 32-bit float samples to `filename`, creating parent directories as needed.
pub fn samples(sample_rate: u32, samples: &[f32], filename: &str) -> Result<()> {
  files::with_dir(filename)?;
  let p: &Path = Path::new(filename);
  let spec = hound::WavSpec {
    channels: 1,
    sample_rate,
    bits_per_sample: 32,
    sample_format: hound::SampleFormat::Float,
  };
  let mut writer = hound::WavWriter::create(p, spec)?;
  for &sample in samples {
    writer.write_sample(sample)?;
  }
  writer.finalize()?;
  Ok(())
}

/// Exports a waveform at `rate` Hz. Values are written as they are (Pascals or raw units).
pub fn waveform(rate: f64, waveform: &[f64], filename: &str) -> Result<()> {
  if rate.fract() != 0.0 || rate < 1.0 || rate > u32::MAX as f64 {
    return Err(StimulusError::invalid("rate", format!("WAV export needs a whole number of Hz, got {}", rate)));
  }
  let buffer: Vec<f32> = waveform.iter().map(|&x| x as f32).collect();
  samples(rate as u32, &buffer, filename)?;
  info!("wrote {} samples at {} Hz to {}", buffer.len(), rate, filename);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_through_hound() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("pip.wav");
    let path = path.to_str().unwrap();
    waveform(8000.0, &[0.0, 0.25, -0.5], path).unwrap();

    let mut reader = hound::WavReader::open(path).unwrap();
    assert_eq!(reader.spec().sample_rate, 8000);
    assert_eq!(reader.spec().channels, 1);
    let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(read, vec![0.0, 0.25, -0.5]);
  }

  #[test]
  fn fractional_rate_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.wav");
    assert!(waveform(44100.5, &[0.0], path.to_str().unwrap()).is_err());
  }
}
