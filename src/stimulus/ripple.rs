use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::error::{Result, StimulusError};
use crate::render::ripple::{synthesize, RippleSpec};
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::TimeBase;

/// Dynamic moving ripple. Only `rate` and `duration` are required; every generator knob
/// has the classic default and is echoed back in the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicRipple {
  pub rate: f64,
  pub duration: f64,
  pub seed: u64,
  pub base_freq: f64,
  pub octaves: f64,
  pub carriers_per_octave: f64,
  pub max_fm_rate: f64,
  pub max_rd: f64,
  pub fm_sample_rate: f64,
  pub rd_sample_rate: f64,
  pub amp: f64,
  pub gain: f64,
}

impl DynamicRipple {
  pub fn spec(&self) -> RippleSpec {
    RippleSpec {
      seed: self.seed,
      base_freq: self.base_freq,
      octaves: self.octaves,
      carriers_per_octave: self.carriers_per_octave,
      max_fm_rate: self.max_fm_rate,
      max_rd: self.max_rd,
      fm_sample_rate: self.fm_sample_rate,
      rd_sample_rate: self.rd_sample_rate,
      amp: self.amp,
      gain: self.gain,
    }
  }
}

impl Variant for DynamicRipple {
  const NAME: &'static str = "DynamicRipple";
  const REQUIRED: &'static [&'static str] = &["rate", "duration"];

  fn from_params(p: &Parameters) -> Result<Self> {
    let d = RippleSpec::default();
    Ok(DynamicRipple {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      seed: p.seed_or("seed", d.seed)?,
      base_freq: p.f64_or("base_freq", d.base_freq)?,
      octaves: p.f64_or("octaves", d.octaves)?,
      carriers_per_octave: p.f64_or("carriers_per_octave", d.carriers_per_octave)?,
      max_fm_rate: p.f64_or("max_fm_rate", d.max_fm_rate)?,
      max_rd: p.f64_or("max_rd", d.max_rd)?,
      fm_sample_rate: p.f64_or("fm_sample_rate", d.fm_sample_rate)?,
      rd_sample_rate: p.f64_or("rd_sample_rate", d.rd_sample_rate)?,
      amp: p.f64_or("amp", d.amp)?,
      gain: p.f64_or("gain", d.gain)?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    checks::below_nyquist("base_freq", self.base_freq, self.rate)?;
    checks::positive("octaves", self.octaves)?;
    checks::positive("carriers_per_octave", self.carriers_per_octave)?;
    if (self.carriers_per_octave * self.octaves).floor() < 1.0 {
      return Err(StimulusError::invalid(
        "carriers_per_octave",
        format!("{} per octave over {} octaves gives no carrier", self.carriers_per_octave, self.octaves),
      ));
    }
    checks::non_negative("max_fm_rate", self.max_fm_rate)?;
    checks::non_negative("max_rd", self.max_rd)?;
    checks::positive("fm_sample_rate", self.fm_sample_rate)?;
    checks::positive("rd_sample_rate", self.rd_sample_rate)?;
    checks::non_negative("amp", self.amp)?;
    checks::positive("gain", self.gain)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, time: &TimeBase, config: &SynthConfig) -> Result<SampleBuffer> {
    synthesize(&self.spec(), time.times(), self.rate, self.duration, config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stimulus::{Parameters, Stimulus};
  use serde_json::json;

  fn ripple(rate: f64, duration: f64) -> DynamicRipple {
    let map = match json!({"rate": rate, "duration": duration}) {
      serde_json::Value::Object(m) => m,
      _ => unreachable!(),
    };
    DynamicRipple::from_params(&Parameters::new(DynamicRipple::NAME, &map)).unwrap()
  }

  #[test]
  fn defaults_fill_the_optional_knobs() {
    let r = ripple(8000.0, 0.05);
    assert_eq!(r.spec(), RippleSpec::default());
  }

  #[test]
  fn peak_equals_gain() {
    let stim = Stimulus::new(ripple(8000.0, 0.05)).unwrap();
    let wave = stim.waveform().unwrap();
    assert_eq!(wave.len(), 400);
    let peak = wave.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    assert!((peak - 0.5).abs() < 1e-12);
  }

  #[test]
  fn zero_gain_is_invalid() {
    let err = Stimulus::new(DynamicRipple { gain: 0.0, ..ripple(8000.0, 0.05) }).unwrap_err();
    assert!(matches!(err, StimulusError::InvalidParameter { ref name, .. } if name == "gain"));
  }
}
