use crate::synth::INDEX_EPSILON;

/// Converts a time in seconds to a sample index, `floor(seconds * rate)`.
pub fn seconds_to_index(seconds: f64, rate: f64) -> isize {
  (seconds * rate + INDEX_EPSILON).floor() as isize
}

/// Number of samples covering `seconds` at `rate`, `floor(seconds * rate)`.
pub fn samples_of_duration(seconds: f64, rate: f64) -> usize {
  let n = (seconds * rate + INDEX_EPSILON).floor();
  if n <= 0.0 {
    0
  } else {
    n as usize
  }
}

/// Uniformly spaced sample times over `[0, duration)`.
///
/// Derived only from `(rate, duration)`; two time bases built from the same pair are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBase {
  rate: f64,
  duration: f64,
  times: Vec<f64>,
}

impl TimeBase {
  pub fn new(rate: f64, duration: f64) -> TimeBase {
    let n = samples_of_duration(duration, rate);
    let times = (0..n).map(|i| i as f64 / rate).collect();
    TimeBase { rate, duration, times }
  }

  pub fn rate(&self) -> f64 {
    self.rate
  }

  pub fn duration(&self) -> f64 {
    self.duration
  }

  pub fn dt(&self) -> f64 {
    1.0 / self.rate
  }

  pub fn len(&self) -> usize {
    self.times.len()
  }

  pub fn is_empty(&self) -> bool {
    self.times.is_empty()
  }

  pub fn times(&self) -> &[f64] {
    &self.times
  }
}
