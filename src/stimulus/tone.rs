use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::envelope::RampShape;
use crate::error::Result;
use crate::modulate::sinusoidal_modulation;
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;
use crate::time_forms::{piptone, PipLayout};

/// One or more tone pips with cosine-ramped edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TonePip {
  pub rate: f64,
  pub duration: f64,
  pub f0: f64,
  /// Peak level; `None` leaves a unit-amplitude sine.
  pub dbspl: Option<f64>,
  /// Length of each pip including both ramps.
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_duration: f64,
}

impl TonePip {
  fn layout(&self) -> PipLayout<'_> {
    PipLayout {
      rate: self.rate,
      duration: self.duration,
      pip_duration: self.pip_duration,
      ramp_duration: self.ramp_duration,
      starts: &self.pip_starts,
    }
  }
}

impl Variant for TonePip {
  const NAME: &'static str = "TonePip";
  const REQUIRED: &'static [&'static str] =
    &["rate", "duration", "f0", "dbspl", "pip_duration", "pip_starts", "ramp_duration"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(TonePip {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      f0: p.f64("f0")?,
      dbspl: p.opt_f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_duration: p.f64("ramp_duration")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::below_nyquist("f0", self.f0, self.rate)?;
    checks::pip_train("pip_starts", self.rate, self.duration, self.pip_duration, self.ramp_duration, &self.pip_starts)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, _time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    piptone(&self.layout(), self.f0, self.dbspl, 0.0, RampShape::Cos2)
  }
}

/// Tone pips under a sinusoidal amplitude envelope that starts at the first pip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SAMTone {
  pub rate: f64,
  pub duration: f64,
  pub f0: f64,
  pub dbspl: Option<f64>,
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_duration: f64,
  /// Modulation frequency, Hz.
  pub fmod: f64,
  /// Modulation depth, percent.
  pub dmod: f64,
}

impl Variant for SAMTone {
  const NAME: &'static str = "SAMTone";
  const REQUIRED: &'static [&'static str] =
    &["rate", "duration", "f0", "dbspl", "pip_duration", "pip_starts", "ramp_duration", "fmod", "dmod"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(SAMTone {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      f0: p.f64("f0")?,
      dbspl: p.opt_f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_duration: p.f64("ramp_duration")?,
      fmod: p.f64("fmod")?,
      dmod: p.f64("dmod")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::below_nyquist("f0", self.f0, self.rate)?;
    checks::modulation(self.fmod, self.dmod)?;
    checks::pip_train("pip_starts", self.rate, self.duration, self.pip_duration, self.ramp_duration, &self.pip_starts)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    let layout = PipLayout {
      rate: self.rate,
      duration: self.duration,
      pip_duration: self.pip_duration,
      ramp_duration: self.ramp_duration,
      starts: &self.pip_starts,
    };
    let base = piptone(&layout, self.f0, self.dbspl, 0.0, RampShape::Cos2)?;
    sinusoidal_modulation(time.times(), &base, self.pip_starts[0], self.fmod, self.dmod, 0.0)
  }
}
