use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::error::{Result, StimulusError};
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;
use crate::time_forms::{fmsweep, SweepLaw};

/// A frequency sweep from `freqs[0]` at `start` to `freqs[1]` at the end of the trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FMSweep {
  pub rate: f64,
  pub duration: f64,
  pub start: f64,
  pub freqs: Vec<f64>,
  /// Sweep law, `linear` or `logarithmic`.
  pub ramp: SweepLaw,
  pub dbspl: Option<f64>,
}

impl Variant for FMSweep {
  const NAME: &'static str = "FMSweep";
  const REQUIRED: &'static [&'static str] = &["rate", "duration", "start", "freqs", "ramp", "dbspl"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(FMSweep {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      start: p.f64("start")?,
      freqs: p.f64_list("freqs")?,
      ramp: p.choice("ramp", &["linear", "logarithmic"])?,
      dbspl: p.opt_f64("dbspl")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    if self.freqs.len() != 2 {
      return Err(StimulusError::invalid(
        "freqs",
        format!("must hold exactly two frequencies [start, end], got {}", self.freqs.len()),
      ));
    }
    for &f in &self.freqs {
      checks::below_nyquist("freqs", f, self.rate)?;
    }
    checks::non_negative("start", self.start)?;
    if self.start >= self.duration {
      return Err(StimulusError::invalid(
        "start",
        format!("{}s must be before the end of the trace ({}s)", self.start, self.duration),
      ));
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
    let freqs = [self.freqs[0], self.freqs[1]];
    Ok(fmsweep(time.times(), self.rate, self.start, self.duration, freqs, self.ramp, self.dbspl))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stimulus::Stimulus;

  fn sweep() -> FMSweep {
    FMSweep { rate: 40000.0, duration: 0.2, start: 0.0, freqs: vec![1000.0, 8000.0], ramp: SweepLaw::Logarithmic, dbspl: None }
  }

  /// Count of upward zero crossings between two sample indices.
  fn crossings(x: &[f64], from: usize, to: usize) -> usize {
    (from + 1..to).filter(|&i| x[i - 1] < 0.0 && x[i] >= 0.0).count()
  }

  #[test]
  fn frequency_rises_over_the_sweep() {
    let stim = Stimulus::new(sweep()).unwrap();
    let wave = stim.waveform().unwrap();
    assert_eq!(wave.len(), 8000);
    let early = crossings(wave, 0, 800);
    let late = crossings(wave, 7200, 8000);
    assert!(late > 4 * early, "early {} late {}", early, late);
  }

  #[test]
  fn three_frequencies_are_rejected() {
    let err = Stimulus::new(FMSweep { freqs: vec![1.0, 2.0, 3.0], ..sweep() }).unwrap_err();
    assert!(matches!(err, StimulusError::InvalidParameter { ref name, .. } if name == "freqs"));
  }

  #[test]
  fn start_after_the_end_is_rejected() {
    assert!(Stimulus::new(FMSweep { start: 0.2, ..sweep() }).is_err());
  }
}
