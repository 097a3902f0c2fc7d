use biquad::{Biquad, Coefficients, DirectForm2Transposed, Type as FilterType};

use crate::error::{Result, StimulusError};
use crate::synth::pi;

/// Section Q values of an even-order Butterworth filter, `1 / (2 cos((2k - 1)π / 2N))`.
pub fn butterworth_qs(order: usize) -> Vec<f64> {
  (1..=order / 2).map(|k| 1.0 / (2.0 * ((2 * k - 1) as f64 * pi / (2 * order) as f64).cos())).collect()
}

/// Which side of the cutoff a cascade passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
  Low,
  High,
}

/// A cascade of second-order sections realizing an even-order Butterworth response.
pub struct Cascade {
  order: usize,
  coefficients: Vec<Coefficients<f64>>,
}

/// A section whose state is what a constant input of `level` leaves behind; returns it
/// with its constant output.
fn settled(c: Coefficients<f64>, level: f64) -> (DirectForm2Transposed<f64>, f64) {
  let gain = (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2);
  let out = gain * level;
  let mut section = DirectForm2Transposed::<f64>::new(c);
  section.s1 = out - c.b0 * level;
  section.s2 = c.b2 * level - c.a2 * out;
  (section, out)
}

/// `signal` extended by `pad` samples at each end, reflected through the end samples.
fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
  let n = signal.len();
  let (first, last) = (signal[0], signal[n - 1]);
  let head = (1..=pad).rev().map(|i| 2.0 * first - signal[i]);
  let tail = (1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]);
  head.chain(signal.iter().copied()).chain(tail).collect()
}

impl Cascade {
  pub fn butterworth(pass: Pass, order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Cascade> {
    if order == 0 || order % 2 != 0 {
      return Err(StimulusError::Generation(format!("Butterworth order must be even and positive, got {}", order)));
    }
    if cutoff_hz <= 0.0 || cutoff_hz >= sample_rate / 2.0 {
      return Err(StimulusError::Generation(format!(
        "cutoff {} Hz must be between 0 and Nyquist ({} Hz)",
        cutoff_hz,
        sample_rate / 2.0
      )));
    }
    // biquad normalizes against 2·fs, so Nyquist maps to 1
    let normalized = 2.0 * cutoff_hz / sample_rate;
    let kind = match pass {
      Pass::Low => FilterType::LowPass,
      Pass::High => FilterType::HighPass,
    };

    let coefficients = butterworth_qs(order)
      .into_iter()
      .map(|q| {
        Coefficients::<f64>::from_normalized_params(kind, normalized, q)
          .map_err(|e| StimulusError::Generation(format!("failed to design filter section: {:?}", e)))
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Cascade { order, coefficients })
  }

  pub fn lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Cascade> {
    Cascade::butterworth(Pass::Low, order, cutoff_hz, sample_rate)
  }

  pub fn highpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Cascade> {
    Cascade::butterworth(Pass::High, order, cutoff_hz, sample_rate)
  }

  /// Causal pass over a whole signal, starting from rest.
  pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
    let sections: Vec<DirectForm2Transposed<f64>> =
      self.coefficients.iter().map(|&c| DirectForm2Transposed::<f64>::new(c)).collect();
    run(sections, signal)
  }

  /// Causal pass whose sections start settled on the first sample, as if the signal
  /// had held that value forever.
  pub fn filter_settled(&self, signal: &[f64]) -> Vec<f64> {
    let Some(&first) = signal.first() else {
      return vec![];
    };
    let mut level = first;
    let sections: Vec<DirectForm2Transposed<f64>> = self
      .coefficients
      .iter()
      .map(|&c| {
        let (section, out) = settled(c, level);
        level = out;
        section
      })
      .collect();
    run(sections, signal)
  }

  /// Zero-phase forward-backward pass. Both ends are padded with `3 · order` samples of
  /// odd reflection and each pass starts settled, so a flat signal stays flat to its edges.
  pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
      return signal.to_vec();
    }
    let pad = (3 * self.order).min(n - 1);
    let extended = odd_extend(signal, pad);
    let mut forward = self.filter_settled(&extended);
    forward.reverse();
    let mut backward = self.filter_settled(&forward);
    backward.reverse();
    backward[pad..pad + n].to_vec()
  }
}

fn run(mut sections: Vec<DirectForm2Transposed<f64>>, signal: &[f64]) -> Vec<f64> {
  signal.iter().map(|&x| sections.iter_mut().fold(x, |acc, section| section.run(acc))).collect()
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`; values outside `xp` clamp to the end points.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
  if xp.is_empty() || xp.len() != fp.len() {
    return vec![0.0; x.len()];
  }
  let last = xp.len() - 1;
  let mut j = 0;
  x.iter()
    .map(|&xi| {
      if xi <= xp[0] {
        return fp[0];
      }
      if xi >= xp[last] {
        return fp[last];
      }
      // x is usually sorted, so resume the search from the previous segment
      if xp[j] > xi {
        j = 0;
      }
      while j + 1 < last && xp[j + 1] <= xi {
        j += 1;
      }
      let span = xp[j + 1] - xp[j];
      if span == 0.0 {
        fp[j]
      } else {
        fp[j] + (fp[j + 1] - fp[j]) * (xi - xp[j]) / span
      }
    })
    .collect()
}
