use serde::Serialize;

use super::checks;
use super::{Parameters, Variant};
use crate::error::{Result, StimulusError};
use crate::sequence::check_placement;
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;
use crate::time::{samples_of_duration, TimeBase};
use crate::time_forms::clicks;

/// A train of rectangular clicks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickTrain {
  pub rate: f64,
  pub duration: f64,
  pub dbspl: Option<f64>,
  pub click_duration: f64,
  pub click_starts: Vec<f64>,
}

impl Variant for ClickTrain {
  const NAME: &'static str = "ClickTrain";
  const REQUIRED: &'static [&'static str] = &["rate", "duration", "dbspl", "click_duration", "click_starts"];

  fn from_params(p: &Parameters) -> Result<Self> {
    Ok(ClickTrain {
      rate: p.f64("rate")?,
      duration: p.f64("duration")?,
      dbspl: p.opt_f64("dbspl")?,
      click_duration: p.f64("click_duration")?,
      click_starts: p.f64_list("click_starts")?,
    })
  }

  fn validate(&self) -> Result<()> {
    checks::timing(self.rate, self.duration)?;
    if self.click_duration < 1.0 / self.rate {
      return Err(StimulusError::invalid(
        "click_duration",
        format!("{}s is shorter than one sample (1 / rate = {}s)", self.click_duration, 1.0 / self.rate),
      ));
    }
    if self.click_starts.is_empty() {
      return Err(StimulusError::invalid("click_starts", "must list at least one start time"));
    }
    let click_len = samples_of_duration(self.click_duration, self.rate);
    check_placement("click_starts", &self.click_starts, click_len, self.rate, self.duration)
  }

  fn rate(&self) -> f64 {
    self.rate
  }

  fn duration(&self) -> f64 {
    self.duration
  }

  fn generate(&self, _time: &TimeBase, _config: &SynthConfig) -> Result<SampleBuffer> {
    clicks(self.rate, self.duration, self.dbspl, self.click_duration, &self.click_starts)
  }
}
