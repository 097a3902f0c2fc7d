use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::error::{Result, StimulusError};
use crate::freq_forms::make_ssn;
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;

/// Noise with the long-term spectrum (and, by default, the envelope) of a reference recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechShapedNoise {
  pub rate: f64,
  pub duration: f64,
  /// Reference recording, sampled at `samplingrate`.
  pub waveform: Vec<f64>,
  pub samplingrate: f64,
  pub seed: u64,
  /// Reimpose the reference envelope on the noise.
  pub keep_env: bool,
}

fn whole_hz(name: &str, rate: f64) -> Result<()> {
  if rate.fract() != 0.0 {
    return Err(StimulusError::invalid(
      name,
      format!("resampling needs a whole number of Hz, got {}", rate),
    ));
  }
  Ok(())
}

impl Variant for SpeechShapedNoise {
  const NAME: &'static str = "SpeechShapedNoise";
  const REQUIRED: &'static [&'static str] = &["rate", "duration", "waveform", "samplingrate"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(SpeechShapedNoise {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      waveform: p.f64_list("waveform")?,
      samplingrate: p.f64("samplingrate")?,
      seed: p.seed_or("seed", 0)?,
      keep_env: p.flag_or("keep_env", true)?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::positive("samplingrate", self.samplingrate)?;
    if self.rate != self.samplingrate {
      whole_hz("rate", self.rate)?;
      whole_hz("samplingrate", self.samplingrate)?;
    }
    if self.waveform.is_empty() {
      return Err(StimulusError::invalid("waveform", "reference recording is empty"));
    }
    let peak = self.waveform.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if peak <= 0.0 {
      return Err(StimulusError::invalid("waveform", "reference recording must have a positive maximum"));
    }
    if self.keep_env {
      checks::below_nyquist("rate", crate::freq_forms::ENVELOPE_CUTOFF_HZ, self.rate)?;
    }
    Ok(())
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    let mut rng = StdRng::seed_from_u64(self.seed);
    make_ssn(self.rate, time.len(), &self.waveform, self.samplingrate, self.keep_env, &mut rng)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stimulus::Stimulus;

  fn reference(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.07).sin() * (i as f64 * 0.003).cos()).collect()
  }

  #[test]
  fn output_fits_the_trace_at_the_reference_rate() {
    let ssn = SpeechShapedNoise {
      rate: 16000.0,
      duration: 0.25,
      waveform: reference(4000),
      samplingrate: 16000.0,
      seed: 1,
      keep_env: true,
    };
    let stim = Stimulus::new(ssn).unwrap();
    assert_eq!(stim.waveform().unwrap().len(), 4000);
  }

  #[test]
  fn reference_is_resampled_to_the_trace_rate() {
    let ssn = SpeechShapedNoise {
      rate: 16000.0,
      duration: 0.5,
      waveform: reference(4000),
      samplingrate: 8000.0,
      seed: 1,
      keep_env: false,
    };
    let stim = Stimulus::new(ssn).unwrap();
    let wave = stim.waveform().unwrap();
    assert_eq!(wave.len(), 8000);
    assert!(wave[..7000].iter().any(|&x| x != 0.0));
  }

  #[test]
  fn fractional_rates_cannot_be_resampled() {
    let ssn = SpeechShapedNoise {
      rate: 16000.0,
      duration: 0.5,
      waveform: reference(100),
      samplingrate: 8000.5,
      seed: 1,
      keep_env: true,
    };
    let err = Stimulus::new(ssn).unwrap_err();
    assert!(matches!(err, StimulusError::InvalidParameter { ref name, .. } if name == "samplingrate"));
  }
}
