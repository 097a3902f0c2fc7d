//! Stimulus variants and the memoized waveform holder.
//!
//! A stimulus is built from a variant name and a parameter mapping, validated at once,
//! and generates its waveform the first time it is read. The waveform is then kept for
//! the life of the instance.

pub mod checks;
pub mod click;
pub mod comodulation;
pub mod noise;
pub mod ripple;
pub mod speech;
pub mod spectrum;
pub mod sweep;
pub mod tone;

use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::volume;
use crate::error::{Result, StimulusError};
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::{samples_of_duration, TimeBase};

/// Named parameter values, as exchanged with callers and stored in descriptors.
pub type ParamMap = Map<String, Value>;

/// Typed reads from a [`ParamMap`] on behalf of one variant.
pub struct Parameters<'a> {
  variant: &'static str,
  map: &'a ParamMap,
}

impl<'a> Parameters<'a> {
  pub fn new(variant: &'static str, map: &'a ParamMap) -> Parameters<'a> {
    Parameters { variant, map }
  }

  pub fn variant(&self) -> &'static str {
    self.variant
  }

  /// Fails on the first name in `names` that has no entry.
  pub fn require(&self, names: &[&str]) -> Result<()> {
    match names.iter().find(|name| !self.map.contains_key(**name)) {
      Some(name) => Err(StimulusError::missing(self.variant, name)),
      None => Ok(()),
    }
  }

  fn value(&self, name: &str) -> Result<&'a Value> {
    self.map.get(name).ok_or_else(|| StimulusError::missing(self.variant, name))
  }

  /// An entry that is present and not null.
  fn given(&self, name: &str) -> Option<&'a Value> {
    self.map.get(name).filter(|v| !v.is_null())
  }

  pub fn f64(&self, name: &str) -> Result<f64> {
    number(name, self.value(name)?)
  }

  /// A required entry that may be `null`, read as `None`.
  pub fn opt_f64(&self, name: &str) -> Result<Option<f64>> {
    match self.value(name)? {
      Value::Null => Ok(None),
      v => number(name, v).map(Some),
    }
  }

  pub fn f64_or(&self, name: &str, default: f64) -> Result<f64> {
    match self.given(name) {
      Some(v) => number(name, v),
      None => Ok(default),
    }
  }

  /// A list of numbers; a lone number is read as a list of one.
  pub fn f64_list(&self, name: &str) -> Result<Vec<f64>> {
    match self.value(name)? {
      Value::Array(items) => items.iter().map(|v| number(name, v)).collect(),
      v => number(name, v).map(|x| vec![x]),
    }
  }

  /// A non-negative integer.
  pub fn count(&self, name: &str) -> Result<usize> {
    unsigned(name, self.value(name)?).map(|n| n as usize)
  }

  /// A random seed; must be an integer `>= 0`.
  pub fn seed(&self, name: &str) -> Result<u64> {
    unsigned(name, self.value(name)?)
  }

  pub fn seed_or(&self, name: &str, default: u64) -> Result<u64> {
    match self.given(name) {
      Some(v) => unsigned(name, v),
      None => Ok(default),
    }
  }

  pub fn flag_or(&self, name: &str, default: bool) -> Result<bool> {
    match self.given(name) {
      Some(Value::Bool(b)) => Ok(*b),
      Some(v) => Err(StimulusError::invalid(name, format!("must be true or false, got {}", v))),
      None => Ok(default),
    }
  }

  /// One of the option names in `allowed`, decoded into its enum.
  pub fn choice<T: DeserializeOwned>(&self, name: &str, allowed: &[&str]) -> Result<T> {
    option(name, self.value(name)?, allowed)
  }

  pub fn choice_or<T: DeserializeOwned>(&self, name: &str, allowed: &[&str], default: T) -> Result<T> {
    match self.given(name) {
      Some(v) => option(name, v, allowed),
      None => Ok(default),
    }
  }
}

fn number(name: &str, value: &Value) -> Result<f64> {
  match value.as_f64() {
    Some(x) if x.is_finite() => Ok(x),
    _ => Err(StimulusError::invalid(name, format!("must be a finite number, got {}", value))),
  }
}

fn unsigned(name: &str, value: &Value) -> Result<u64> {
  if let Some(n) = value.as_u64() {
    return Ok(n);
  }
  let signed = match (value.as_i64(), value.as_f64()) {
    (Some(n), _) => Some(n as f64),
    (None, Some(x)) if x.fract() == 0.0 => Some(x),
    _ => None,
  };
  match signed {
    Some(x) if x < 0.0 => Err(StimulusError::invalid(name, format!("must be >= 0, got {}", value))),
    Some(x) if x <= u64::MAX as f64 => Ok(x as u64),
    _ => Err(StimulusError::invalid(name, format!("must be a non-negative integer, got {}", value))),
  }
}

fn option<T: DeserializeOwned>(name: &str, value: &Value, allowed: &[&str]) -> Result<T> {
  match value {
    Value::String(_) => serde_json::from_value(value.clone()).map_err(|_| {
      StimulusError::invalid(name, format!("{} is not one of: {}", value, allowed.join(", ")))
    }),
    _ => Err(StimulusError::invalid(name, format!("must be one of: {}", allowed.join(", ")))),
  }
}

/// One stimulus family: its parameter set, constraints and generator.
pub trait Variant: Serialize + Sized {
  const NAME: &'static str;
  /// Keys that must be present. Anything else read by `from_params` has a default.
  const REQUIRED: &'static [&'static str];

  fn from_params(p: &Parameters) -> Result<Self>;

  /// Numeric and placement constraints, run before any generation work.
  fn validate(&self) -> Result<()>;

  fn rate(&self) -> f64;

  fn duration(&self) -> f64;

  fn generate(&self, time: &TimeBase, config: &SynthConfig) -> Result<SampleBuffer>;
}

fn to_param_map<V: Serialize>(v: &V) -> Result<ParamMap> {
  match serde_json::to_value(v)? {
    Value::Object(map) => Ok(map),
    other => Err(StimulusError::Generation(format!("parameters did not encode as a mapping: {}", other))),
  }
}

macro_rules! stimulus_params {
  ($($variant:ident),* $(,)?) => {
    /// The typed parameter set of one stimulus, tagged by family.
    #[derive(Debug, Clone, Serialize)]
    #[serde(untagged)]
    pub enum StimulusParams {
      $($variant($variant)),*
    }

    $(
      impl From<$variant> for StimulusParams {
        fn from(v: $variant) -> Self {
          StimulusParams::$variant(v)
        }
      }
    )*

    impl StimulusParams {
      pub fn name(&self) -> &'static str {
        match self {
          $(StimulusParams::$variant(_) => <$variant as Variant>::NAME),*
        }
      }

      pub fn rate(&self) -> f64 {
        match self {
          $(StimulusParams::$variant(v) => v.rate()),*
        }
      }

      pub fn duration(&self) -> f64 {
        match self {
          $(StimulusParams::$variant(v) => v.duration()),*
        }
      }

      pub fn validate(&self) -> Result<()> {
        match self {
          $(StimulusParams::$variant(v) => v.validate()),*
        }
      }

      fn generate(&self, time: &TimeBase, config: &SynthConfig) -> Result<SampleBuffer> {
        match self {
          $(StimulusParams::$variant(v) => v.generate(time, config)),*
        }
      }

      /// The parameter mapping that rebuilds this set, defaults included.
      pub fn parameters(&self) -> Result<ParamMap> {
        match self {
          $(StimulusParams::$variant(v) => to_param_map(v)),*
        }
      }
    }
  };
}

pub use click::ClickTrain;
pub use comodulation::ComodulationMasking;
pub use noise::{NoiseBandPip, NoisePip, SAMNoise};
pub use ripple::DynamicRipple;
pub use spectrum::RandomSpectrumShape;
pub use speech::SpeechShapedNoise;
pub use sweep::FMSweep;
pub use tone::{SAMTone, TonePip};

stimulus_params!(
  TonePip,
  NoisePip,
  ClickTrain,
  FMSweep,
  SAMTone,
  SAMNoise,
  NoiseBandPip,
  ComodulationMasking,
  DynamicRipple,
  SpeechShapedNoise,
  RandomSpectrumShape,
);

/// Variant name plus the exact mapping needed to rebuild an identical stimulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
  pub variant: String,
  pub parameters: ParamMap,
}

impl Descriptor {
  pub fn create(&self) -> Result<Stimulus> {
    crate::registry::create(&self.variant, &self.parameters)
  }
}

/// A validated stimulus whose waveform is generated once, on first read.
///
/// The waveform cell is either pending (nothing computed yet) or ready; once ready it
/// never changes.
#[derive(Debug)]
pub struct Stimulus {
  params: StimulusParams,
  config: SynthConfig,
  time: OnceCell<TimeBase>,
  waveform: OnceCell<SampleBuffer>,
}

impl Stimulus {
  /// Validates `params`; scheduling knobs come from the environment.
  pub fn new(params: impl Into<StimulusParams>) -> Result<Stimulus> {
    let params = params.into();
    params.validate()?;
    debug!("built {} at {} Hz for {}s", params.name(), params.rate(), params.duration());
    Ok(Stimulus { params, config: SynthConfig::from_env(), time: OnceCell::new(), waveform: OnceCell::new() })
  }

  pub fn with_config(mut self, config: SynthConfig) -> Stimulus {
    self.config = config;
    self
  }

  pub fn name(&self) -> &'static str {
    self.params.name()
  }

  pub fn params(&self) -> &StimulusParams {
    &self.params
  }

  pub fn sample_rate(&self) -> f64 {
    self.params.rate()
  }

  pub fn duration(&self) -> f64 {
    self.params.duration()
  }

  pub fn num_samples(&self) -> usize {
    samples_of_duration(self.duration(), self.sample_rate())
  }

  pub fn dt(&self) -> f64 {
    1.0 / self.sample_rate()
  }

  pub fn time_base(&self) -> &TimeBase {
    self.time.get_or_init(|| TimeBase::new(self.sample_rate(), self.duration()))
  }

  /// Whether the waveform has been generated yet.
  pub fn is_ready(&self) -> bool {
    self.waveform.get().is_some()
  }

  pub fn waveform(&self) -> Result<&[f64]> {
    let wave = self.waveform.get_or_try_init(|| {
      info!("generating {} ({} samples)", self.name(), self.num_samples());
      let wave = self.params.generate(self.time_base(), &self.config)?;
      if wave.len() != self.num_samples() {
        return Err(StimulusError::Generation(format!(
          "{} produced {} samples, expected {}",
          self.name(),
          wave.len(),
          self.num_samples()
        )));
      }
      Ok(wave)
    })?;
    Ok(wave)
  }

  pub fn descriptor(&self) -> Result<Descriptor> {
    Ok(Descriptor { variant: self.name().to_string(), parameters: self.params.parameters()? })
  }

  /// Level in dB SPL of the waveform between `tstart` and `tend` seconds.
  pub fn measure_dbspl(&self, tstart: f64, tend: f64) -> Result<f64> {
    volume::measure_dbspl(self.waveform()?, self.sample_rate(), tstart, tend)
  }
}
