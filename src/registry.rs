//! Variant names mapped to their constructors.

use std::collections::BTreeMap;

use log::{error, warn};
use once_cell::sync::Lazy;

use crate::error::{Result, StimulusError};
use crate::stimulus::*;

type Construct = fn(&ParamMap) -> Result<StimulusParams>;

/// How to build one variant from a parameter mapping.
#[derive(Clone, Copy)]
pub struct Entry {
  pub name: &'static str,
  pub required: &'static [&'static str],
  construct: Construct,
}

impl Entry {
  pub fn of<V: Variant + Into<StimulusParams>>() -> Entry {
    Entry { name: V::NAME, required: V::REQUIRED, construct: construct::<V> }
  }

  pub fn construct(&self, params: &ParamMap) -> Result<StimulusParams> {
    (self.construct)(params)
  }
}

fn construct<V: Variant + Into<StimulusParams>>(params: &ParamMap) -> Result<StimulusParams> {
  let p = Parameters::new(V::NAME, params);
  p.require(V::REQUIRED)?;
  let variant = V::from_params(&p)?;
  let known = serde_json::to_value(&variant)?;
  for key in params.keys().filter(|k| known.get(k.as_str()).is_none()) {
    warn!("{} ignores unknown parameter '{}'", V::NAME, key);
  }
  Ok(variant.into())
}

#[derive(Default)]
pub struct Registry {
  entries: BTreeMap<&'static str, Entry>,
}

impl Registry {
  /// Every variant this crate ships.
  pub fn builtin() -> Registry {
    let mut registry = Registry::default();
    let entries = [
      Entry::of::<TonePip>(),
      Entry::of::<NoisePip>(),
      Entry::of::<ClickTrain>(),
      Entry::of::<FMSweep>(),
      Entry::of::<SAMTone>(),
      Entry::of::<SAMNoise>(),
      Entry::of::<NoiseBandPip>(),
      Entry::of::<ComodulationMasking>(),
      Entry::of::<DynamicRipple>(),
      Entry::of::<SpeechShapedNoise>(),
      Entry::of::<RandomSpectrumShape>(),
    ];
    for entry in entries {
      if let Err(e) = registry.register(entry) {
        error!("{}", e);
      }
    }
    registry
  }

  /// Adds `entry`; a name can be registered only once.
  pub fn register(&mut self, entry: Entry) -> Result<()> {
    if self.entries.contains_key(entry.name) {
      return Err(StimulusError::invalid("variant", format!("{} is already registered", entry.name)));
    }
    self.entries.insert(entry.name, entry);
    Ok(())
  }

  pub fn lookup(&self, name: &str) -> Result<&Entry> {
    self.entries.get(name).ok_or_else(|| StimulusError::UnsupportedVariant(name.to_string()))
  }

  pub fn names(&self) -> Vec<&'static str> {
    self.entries.keys().copied().collect()
  }

  /// Builds and validates a stimulus. No waveform work is done here.
  pub fn create(&self, name: &str, params: &ParamMap) -> Result<Stimulus> {
    let entry = self.lookup(name)?;
    Stimulus::new(entry.construct(params)?)
  }
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::builtin);

pub fn registry() -> &'static Registry {
  &REGISTRY
}

pub fn create(name: &str, params: &ParamMap) -> Result<Stimulus> {
  REGISTRY.create(name, params)
}

/// Names of the registered variants, sorted.
pub fn variants() -> Vec<&'static str> {
  REGISTRY.names()
}
