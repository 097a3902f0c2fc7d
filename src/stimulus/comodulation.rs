//! Comodulation masking release: an amplitude-modulated target tone under an on-frequency
//! masker, optionally flanked by tones whose modulation is in phase with the masker,
//! spread across the cycle, or random.

use itertools::izip;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::checks;
use super::{Parameters, Variant};
use crate::envelope::RampShape;
use crate::error::{Result, StimulusError};
use crate::modulate::sinusoidal_modulation;
use crate::sequence::sum_buffers;
use crate::synth::{pi, pi2, SampleBuffer};
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;
use crate::time_forms::{piptone, PipLayout};

pub const MAX_FLANKING_BANDS: usize = 5;
const WINDOW_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlankingType {
  MultiTone,
  /// Narrow-band noise flankers; not implemented.
  NBNoise,
  #[serde(rename = "None")]
  Absent,
}

/// Modulation phase of each flanking band relative to the on-frequency masker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlankingPhase {
  Comodulated,
  Codeviant,
  Random,
}

/// Which part of the composite is returned as the waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmrOutput {
  Signal,
  Target,
  OFM,
  Flanking,
  #[serde(rename = "Target+OFM")]
  TargetOFM,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComodulationMasking {
  pub rate: f64,
  pub duration: f64,
  pub masker_spl: Option<f64>,
  pub target_spl: Option<f64>,
  pub masker_delay: f64,
  pub masker_duration: f64,
  pub target_f0: f64,
  /// On-frequency masker frequency; `None` puts it at `target_f0`.
  pub masker_f0: Option<f64>,
  pub target_duration: f64,
  pub target_delay: f64,
  pub fmod: f64,
  pub dmod: f64,
  pub ramp_duration: f64,
  pub flanking_type: FlankingType,
  /// Octaves between neighbouring flanking tones.
  pub flanking_spacing: f64,
  pub flanking_phase: FlankingPhase,
  /// Flanking tones on each side of the target.
  pub flanking_bands: usize,
  pub output: CmrOutput,
  /// Seed for `Random` flanking phases.
  pub seed: u64,
}

/// The separately generated parts of a CMR stimulus.
#[derive(Debug, Clone)]
pub struct Components {
  pub target: SampleBuffer,
  pub on_freq_masker: SampleBuffer,
  /// Sum of the flanking tones; `None` when there are none.
  pub flanking: Option<SampleBuffer>,
}

impl ComodulationMasking {
  pub fn masker_freq(&self) -> f64 {
    self.masker_f0.unwrap_or(self.target_f0)
  }

  /// Flanking bands actually generated.
  pub fn bands(&self) -> usize {
    match self.flanking_type {
      FlankingType::MultiTone => self.flanking_bands,
      _ => 0,
    }
  }

  /// Flanking tone frequencies, `target_f0 · 2^(±spacing·k)` for `k = 1..=bands`, ascending.
  pub fn flanking_freqs(&self) -> Vec<f64> {
    let n = self.bands();
    let mut freqs: Vec<f64> = (0..n)
      .map(|k| self.target_f0 * 2f64.powf(self.flanking_spacing * (k + 1) as f64))
      .chain((0..n).map(|k| self.target_f0 / 2f64.powf(self.flanking_spacing * (k + 1) as f64)))
      .collect();
    freqs.sort_by(|a, b| a.total_cmp(b));
    freqs
  }

  /// Modulation and carrier phase of each flanking tone, in the order of `flanking_freqs`.
  pub fn flanking_phases(&self) -> Vec<f64> {
    let count = 2 * self.bands();
    match self.flanking_phase {
      FlankingPhase::Comodulated => vec![0.0; count],
      FlankingPhase::Codeviant => (0..count).map(|i| pi2 * i as f64 / count as f64).collect(),
      FlankingPhase::Random => {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..count).map(|_| pi2 * rng.gen::<f64>()).collect()
      }
    }
  }

  fn layout<'a>(&self, starts: &'a [f64], pip_duration: f64) -> PipLayout<'a> {
    PipLayout {
      rate: self.rate,
      duration: self.duration,
      pip_duration,
      ramp_duration: self.ramp_duration,
      starts,
    }
  }

  pub fn components(&self, time: &TimeBase) -> Result<Components> {
    let times = time.times();

    // target runs half a modulation cycle out of phase with the masker
    let target_start = [self.target_delay];
    let target = piptone(&self.layout(&target_start, self.target_duration), self.target_f0, self.target_spl, 0.0, RampShape::Cos2)?;
    let target = sinusoidal_modulation(times, &target, self.target_delay, self.fmod, self.dmod, pi)?;

    let masker_start = [self.masker_delay];
    let masker_layout = self.layout(&masker_start, self.masker_duration);
    let masker = piptone(&masker_layout, self.masker_freq(), self.masker_spl, 0.0, RampShape::Cos2)?;
    let on_freq_masker = sinusoidal_modulation(times, &masker, self.masker_delay, self.fmod, self.dmod, 0.0)?;

    let freqs = self.flanking_freqs();
    let flanking = if freqs.is_empty() {
      None
    } else {
      let phases = self.flanking_phases();
      debug!("CMR flanking tones {:?} Hz at phases {:?}", freqs, phases);
      let tones = freqs
        .iter()
        .zip(phases.iter())
        .map(|(&f, &phase)| {
          let tone = piptone(&masker_layout, f, self.masker_spl, phase, RampShape::Cos2)?;
          sinusoidal_modulation(times, &tone, self.masker_delay, self.fmod, self.dmod, phase)
        })
        .collect::<Result<Vec<SampleBuffer>>>()?;
      Some(sum_buffers(&tones, times.len())?)
    };

    Ok(Components { target, on_freq_masker, flanking })
  }
}

impl Variant for ComodulationMasking {
  const NAME: &'static str = "ComodulationMasking";
  const REQUIRED: &'static [&'static str] = &[
    "rate",
    "duration",
    "masker_spl",
    "target_spl",
    "masker_delay",
    "masker_duration",
    "target_f0",
    "masker_f0",
    "target_duration",
    "target_delay",
    "fmod",
    "dmod",
    "ramp_duration",
    "flanking_type",
    "flanking_spacing",
    "flanking_phase",
    "flanking_bands",
    "output",
  ];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(ComodulationMasking {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      masker_spl: p.opt_f64("masker_spl")?,
      target_spl: p.opt_f64("target_spl")?,
      masker_delay: p.f64("masker_delay")?,
      masker_duration: p.f64("masker_duration")?,
      target_f0: p.f64("target_f0")?,
      masker_f0: p.opt_f64("masker_f0")?,
      target_duration: p.f64("target_duration")?,
      target_delay: p.f64("target_delay")?,
      fmod: p.f64("fmod")?,
      dmod: p.f64("dmod")?,
      ramp_duration: p.f64("ramp_duration")?,
      flanking_type: p.choice("flanking_type", &["MultiTone", "NBNoise", "None"])?,
      flanking_spacing: p.f64("flanking_spacing")?,
      flanking_phase: p.choice("flanking_phase", &["Comodulated", "Codeviant", "Random"])?,
      flanking_bands: p.count("flanking_bands")?,
      output: p.choice("output", &["Signal", "Target", "OFM", "Flanking", "Target+OFM"])?,
      seed: p.seed_or("seed", 0)?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    if self.flanking_type == FlankingType::NBNoise {
      return Err(StimulusError::UnsupportedVariant(
        "ComodulationMasking flanking_type 'NBNoise' is not implemented".to_string(),
      ));
    }
    if self.flanking_bands > MAX_FLANKING_BANDS {
      return Err(StimulusError::invalid(
        "flanking_bands",
        format!("must be between 0 and {}, got {}", MAX_FLANKING_BANDS, self.flanking_bands),
      ));
    }
    if !(self.flanking_spacing > 0.05 && self.flanking_spacing < 3.0) {
      return Err(StimulusError::invalid(
        "flanking_spacing",
        format!("must be between 0.05 and 3 octaves (exclusive), got {}", self.flanking_spacing),
      ));
    }
    if !(self.fmod > 0.5 && self.fmod < 1000.0) {
      return Err(StimulusError::invalid("fmod", format!("must be between 0.5 and 1000 Hz (exclusive), got {}", self.fmod)));
    }
    checks::modulation(self.fmod, self.dmod)?;

    checks::below_nyquist("target_f0", self.target_f0, self.rate)?;
    checks::below_nyquist("masker_f0", self.masker_freq(), self.rate)?;
    if let Some(&highest) = self.flanking_freqs().last() {
      checks::below_nyquist("flanking_spacing", highest, self.rate)?;
    }

    checks::non_negative("masker_delay", self.masker_delay)?;
    checks::non_negative("target_delay", self.target_delay)?;
    let masker_end = self.masker_delay + self.masker_duration;
    let target_end = self.target_delay + self.target_duration;
    if (masker_end - target_end).abs() > WINDOW_TOLERANCE {
      return Err(StimulusError::invalid(
        "masker_delay/target_delay",
        format!("masker window ends at {}s but target window ends at {}s; they must end together", masker_end, target_end),
      ));
    }
    if masker_end <= 0.0 || masker_end > self.duration + WINDOW_TOLERANCE {
      return Err(StimulusError::invalid(
        "masker_duration",
        format!("window end {}s must be positive and within the {}s trace", masker_end, self.duration),
      ));
    }

    checks::pip_train("masker_delay", self.rate, self.duration, self.masker_duration, self.ramp_duration, &[self.masker_delay])?;
    checks::pip_train("target_delay", self.rate, self.duration, self.target_duration, self.ramp_duration, &[self.target_delay])
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    let Components { target, on_freq_masker, flanking } = self.components(time)?;
    let wave = match self.output {
      CmrOutput::Target => target,
      CmrOutput::OFM => on_freq_masker,
      CmrOutput::Flanking => flanking.unwrap_or_else(|| vec![0.0; time.len()]),
      CmrOutput::TargetOFM => target.iter().zip(on_freq_masker.iter()).map(|(t, m)| t + m).collect(),
      CmrOutput::Signal => {
        let divisor = (self.bands() + 2) as f64;
        match flanking {
          Some(flank) => izip!(&on_freq_masker, &flank, &target).map(|(m, f, t)| (m + f + t) / divisor).collect(),
          None => on_freq_masker.iter().zip(target.iter()).map(|(m, t)| (m + t) / divisor).collect(),
        }
      }
    };
    Ok(wave)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stimulus::Stimulus;

  fn cmr() -> ComodulationMasking {
    ComodulationMasking {
      rate: 40000.0,
      duration: 0.5,
      masker_spl: Some(40.0),
      target_spl: Some(30.0),
      masker_delay: 0.05,
      masker_duration: 0.3,
      target_f0: 4000.0,
      masker_f0: None,
      target_duration: 0.2,
      target_delay: 0.15,
      fmod: 10.0,
      dmod: 100.0,
      ramp_duration: 0.01,
      flanking_type: FlankingType::MultiTone,
      flanking_spacing: 1.0,
      flanking_phase: FlankingPhase::Comodulated,
      flanking_bands: 2,
      output: CmrOutput::Signal,
      seed: 0,
    }
  }

  #[test]
  fn flanking_bands_are_octave_spaced_and_sorted() {
    let c = cmr();
    assert_eq!(c.flanking_freqs(), vec![1000.0, 2000.0, 8000.0, 16000.0]);
  }

  #[test]
  fn codeviant_phases_spread_over_a_cycle() {
    let c = ComodulationMasking { flanking_phase: FlankingPhase::Codeviant, ..cmr() };
    let phases = c.flanking_phases();
    assert_eq!(phases.len(), 4);
    assert_eq!(phases[0], 0.0);
    assert!((phases[2] - pi).abs() < 1e-12);
  }

  #[test]
  fn random_phases_follow_the_seed() {
    let a = ComodulationMasking { flanking_phase: FlankingPhase::Random, seed: 3, ..cmr() };
    let b = ComodulationMasking { seed: 4, ..a.clone() };
    assert_eq!(a.flanking_phases(), a.clone().flanking_phases());
    assert_ne!(a.flanking_phases(), b.flanking_phases());
  }

  #[test]
  fn signal_is_the_normalized_sum_of_the_parts() {
    let c = cmr();
    let stim = Stimulus::new(c.clone()).unwrap();
    let parts = c.components(stim.time_base()).unwrap();
    let flank = parts.flanking.unwrap();
    for (i, s) in stim.waveform().unwrap().iter().enumerate() {
      let want = (parts.on_freq_masker[i] + flank[i] + parts.target[i]) / 4.0;
      assert_eq!(*s, want);
    }
  }

  #[test]
  fn nb_noise_is_unsupported() {
    let err = Stimulus::new(ComodulationMasking { flanking_type: FlankingType::NBNoise, ..cmr() }).unwrap_err();
    assert!(matches!(err, StimulusError::UnsupportedVariant(_)));
  }

  #[test]
  fn windows_must_end_together() {
    let err = Stimulus::new(ComodulationMasking { target_duration: 0.25, ..cmr() }).unwrap_err();
    assert!(matches!(err, StimulusError::InvalidParameter { .. }));
  }

  #[test]
  fn flanker_above_nyquist_is_rejected() {
    let err = Stimulus::new(ComodulationMasking { flanking_bands: 3, ..cmr() }).unwrap_err();
    assert!(matches!(err, StimulusError::InvalidParameter { ref name, .. } if name == "flanking_spacing"));
  }

  #[test]
  fn no_flanking_type_means_target_plus_masker_over_two() {
    let c = ComodulationMasking { flanking_type: FlankingType::Absent, ..cmr() };
    let stim = Stimulus::new(c).unwrap();
    let target = Stimulus::new(ComodulationMasking { flanking_type: FlankingType::Absent, output: CmrOutput::Target, ..cmr() }).unwrap();
    let masker = Stimulus::new(ComodulationMasking { flanking_type: FlankingType::Absent, output: CmrOutput::OFM, ..cmr() }).unwrap();
    for ((s, t), m) in stim.waveform().unwrap().iter().zip(target.waveform().unwrap()).zip(masker.waveform().unwrap()) {
      assert_eq!(*s, (m + t) / 2.0);
    }
  }
}
