use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::error::{Result, StimulusError};
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;
use crate::time_forms::{modnoise, noise_band, pipnoise, BandShape, PipLayout};

/// One or more Gaussian noise pips with cosine-ramped edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoisePip {
  pub rate: f64,
  pub duration: f64,
  pub dbspl: Option<f64>,
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_duration: f64,
  pub seed: u64,
}

impl Variant for NoisePip {
  const NAME: &'static str = "NoisePip";
  const REQUIRED: &'static [&'static str] =
    &["rate", "duration", "dbspl", "pip_duration", "pip_starts", "ramp_duration", "seed"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(NoisePip {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      dbspl: p.opt_f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_duration: p.f64("ramp_duration")?,
      seed: p.seed("seed")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::pip_train("pip_starts", self.rate, self.duration, self.pip_duration, self.ramp_duration, &self.pip_starts)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, _time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    let layout = PipLayout {
      rate: self.rate,
      duration: self.duration,
      pip_duration: self.pip_duration,
      ramp_duration: self.ramp_duration,
      starts: &self.pip_starts,
    };
    pipnoise(&layout, self.dbspl, self.seed)
  }
}

/// Noise pips under a sinusoidal amplitude envelope, with linear ramps at the trace edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SAMNoise {
  pub rate: f64,
  pub duration: f64,
  /// Level in dB SPL; required, unlike the other noise variants.
  pub dbspl: f64,
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_duration: f64,
  pub fmod: f64,
  pub dmod: f64,
  pub seed: u64,
}

impl Variant for SAMNoise {
  const NAME: &'static str = "SAMNoise";
  const REQUIRED: &'static [&'static str] =
    &["rate", "duration", "dbspl", "pip_duration", "pip_starts", "ramp_duration", "fmod", "dmod", "seed"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(SAMNoise {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      dbspl: p.f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_duration: p.f64("ramp_duration")?,
      fmod: p.f64("fmod")?,
      dmod: p.f64("dmod")?,
      seed: p.seed("seed")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
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
    modnoise(&layout, time.times(), Some(self.dbspl), self.seed, self.fmod, self.dmod, 0.0)
  }
}

/// Narrow-band (or notched) noise pips made by quadrature mixing of two filtered noises
/// (Nelken & Young).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseBandPip {
  pub rate: f64,
  pub duration: f64,
  pub dbspl: Option<f64>,
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_duration: f64,
  pub seed: u64,
  /// Low-pass cutoff of each quadrature noise, Hz.
  pub noisebw: f64,
  #[serde(rename = "type")]
  pub kind: BandShape,
  /// High-pass cutoff for `BP+Notch`, Hz.
  pub notchbw: f64,
  pub centerfreq: f64,
}

impl Variant for NoiseBandPip {
  const NAME: &'static str = "NoiseBandPip";
  const REQUIRED: &'static [&'static str] = &[
    "rate",
    "duration",
    "dbspl",
    "pip_duration",
    "pip_starts",
    "ramp_duration",
    "seed",
    "noisebw",
    "type",
    "notchbw",
    "centerfreq",
  ];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(NoiseBandPip {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      dbspl: p.opt_f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_duration: p.f64("ramp_duration")?,
      seed: p.seed("seed")?,
      noisebw: p.f64("noisebw")?,
      kind: p.choice("type", &["Bandpass", "BP+Notch"])?,
      notchbw: p.f64("notchbw")?,
      centerfreq: p.f64("centerfreq")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::below_nyquist("noisebw", self.noisebw, self.rate)?;
    checks::below_nyquist("centerfreq", self.centerfreq, self.rate)?;
    if self.kind == BandShape::BandpassNotch {
      checks::below_nyquist("notchbw", self.notchbw, self.rate)?;
      if self.notchbw >= self.noisebw {
        return Err(StimulusError::invalid(
          "notchbw",
          format!("{} Hz must be below noisebw ({} Hz)", self.notchbw, self.noisebw),
        ));
      }
    }
    if self.seed == u64::MAX {
      return Err(StimulusError::invalid("seed", "seed + 1 must also be a valid seed"));
    }
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
    noise_band(&layout, time.times(), self.dbspl, self.seed, self.kind, self.noisebw, self.notchbw, self.centerfreq)
  }
}
