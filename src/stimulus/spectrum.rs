use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::envelope::{linspace, RampShape};
use crate::error::{Result, StimulusError};
use crate::synth::{pi2, SampleBuffer};
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;
use crate::time_forms::{piptone, PipLayout};

/// Tones per octave in the bank.
pub const TONES_PER_OCTAVE: f64 = 64.0;

/// Level used for every group when `dbspl` is null.
pub const DEFAULT_DBSPL: f64 = 80.0;

/// A bank of log-spaced tone pips spanning `octaves` either side of `f0`, with levels
/// perturbed in groups of `amp_group_size` adjacent tones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomSpectrumShape {
  pub rate: f64,
  pub duration: f64,
  pub f0: f64,
  pub dbspl: Option<f64>,
  pub pip_duration: f64,
  pub pip_starts: Vec<f64>,
  pub ramp_type: RampShape,
  pub ramp_duration: f64,
  pub amp_group_size: usize,
  /// Standard deviation of the per-group level offset, dB.
  pub amp_sd: f64,
  pub octaves: f64,
  pub seed: u64,
}

impl RandomSpectrumShape {
  pub fn frequencies(&self) -> Vec<f64> {
    let n = (2.0 * self.octaves * TONES_PER_OCTAVE).floor() as usize + 1;
    linspace(-self.octaves, self.octaves, n).into_iter().map(|o| self.f0 * 2f64.powf(o)).collect()
  }

  /// Per-tone levels in dB SPL and starting phases, drawn from one seeded generator.
  pub fn levels_and_phases(&self, n_tones: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let base = self.dbspl.unwrap_or(DEFAULT_DBSPL);
    let mut rng = StdRng::seed_from_u64(self.seed);
    let mut levels = Vec::with_capacity(n_tones);
    if self.amp_sd > 0.0 {
      let offsets = Normal::new(0.0, self.amp_sd).map_err(|e| StimulusError::invalid("amp_sd", e.to_string()))?;
      while levels.len() < n_tones {
        let level = base + offsets.sample(&mut rng);
        let group = self.amp_group_size.min(n_tones - levels.len());
        levels.extend(std::iter::repeat(level).take(group));
      }
    } else {
      levels.resize(n_tones, base);
    }
    let phases = (0..n_tones).map(|_| rng.gen_range(0.0..pi2)).collect();
    Ok((levels, phases))
  }
}

impl Variant for RandomSpectrumShape {
  const NAME: &'static str = "RandomSpectrumShape";
  const REQUIRED: &'static [&'static str] = &[
    "rate",
    "duration",
    "f0",
    "dbspl",
    "pip_duration",
    "pip_starts",
    "ramp_duration",
    "amp_group_size",
    "amp_sd",
    "octaves",
  ];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(RandomSpectrumShape {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      f0: p.f64("f0")?,
      dbspl: p.opt_f64("dbspl")?,
      pip_duration: p.f64("pip_duration")?,
      pip_starts: p.f64_list("pip_starts")?,
      ramp_type: p.choice_or("ramp_type", &["linear", "cos2"], RampShape::Cos2)?,
      ramp_duration: p.f64("ramp_duration")?,
      amp_group_size: p.count("amp_group_size")?,
      amp_sd: p.f64("amp_sd")?,
      octaves: p.f64("octaves")?,
      seed: p.seed_or("seed", 0)?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::below_nyquist("f0", self.f0, self.rate)?;
    checks::positive("octaves", self.octaves)?;
    let top = self.f0 * 2f64.powf(self.octaves);
    if top >= self.rate / 2.0 {
      return Err(StimulusError::invalid(
        "octaves",
        format!("highest tone {} Hz must be less than rate / 2 ({} Hz)", top, self.rate / 2.0),
      ));
    }
    if self.amp_group_size == 0 {
      return Err(StimulusError::invalid("amp_group_size", "groups must hold at least one tone"));
    }
    checks::non_negative("amp_sd", self.amp_sd)?;
    checks::pip_train("pip_starts", self.rate, self.duration, self.pip_duration, self.ramp_duration, &self.pip_starts)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    let freqs = self.frequencies();
    let (levels, phases) = self.levels_and_phases(freqs.len())?;
    debug!("random spectrum: {} tones from {} Hz to {} Hz", freqs.len(), freqs[0], freqs[freqs.len() - 1]);
    let layout = PipLayout {
      rate: self.rate,
      duration: self.duration,
      pip_duration: self.pip_duration,
      ramp_duration: self.ramp_duration,
      starts: &self.pip_starts,
    };
    let mut total = vec![0.0; time.len()];
    for ((&f, &level), &phase) in freqs.iter().zip(&levels).zip(&phases) {
      let tone = piptone(&layout, f, Some(level), phase, self.ramp_type)?;
      for (acc, x) in total.iter_mut().zip(tone) {
        *acc += x;
      }
    }
    Ok(total)
  }
}
