//! Generation of stimulus waveforms in the time domain: pips, clicks, sweeps and modulated noise.

use itertools::izip;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::analysis::freq::Cascade;
use crate::calibration::level_scale;
use crate::envelope::{apply_edge_ramps, linear_ramp, ramp_points, RampShape};
use crate::error::{Result, StimulusError};
use crate::modulate::sam_envelope;
use crate::sequence::place_pips;
use crate::synth::{pi2, SampleBuffer};
use crate::time::{samples_of_duration, seconds_to_index};

/// Where and how long the pips of a train sit inside the full trace.
#[derive(Debug, Clone, Copy)]
pub struct PipLayout<'a> {
  pub rate: f64,
  pub duration: f64,
  pub pip_duration: f64,
  pub ramp_duration: f64,
  pub starts: &'a [f64],
}

impl<'a> PipLayout<'a> {
  pub fn template_len(&self) -> usize {
    samples_of_duration(self.pip_duration, self.rate)
  }

  pub fn ramp_points(&self) -> usize {
    ramp_points(self.ramp_duration, self.rate)
  }
}

/// Tone pips at `f0`, `√2 · pascals(dbspl)` peak, starting at `phase` radians.
pub fn piptone(layout: &PipLayout, f0: f64, dbspl: Option<f64>, phase: f64, shape: RampShape) -> Result<SampleBuffer> {
  let amplitude = level_scale(dbspl, 2f64.sqrt());
  let mut pip: SampleBuffer =
    (0..layout.template_len()).map(|i| amplitude * (pi2 * f0 * i as f64 / layout.rate + phase).sin()).collect();
  apply_edge_ramps(&mut pip, layout.ramp_points(), shape)?;
  place_pips("pip_starts", &pip, layout.starts, layout.rate, layout.duration)
}

/// `len` standard normal draws from a generator seeded with `seed`, times `amplitude`.
pub fn noise_template(len: usize, seed: u64, amplitude: f64) -> SampleBuffer {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..len)
    .map(|_| {
      let x: f64 = StandardNormal.sample(&mut rng);
      amplitude * x
    })
    .collect()
}

/// Gaussian noise pips. Every pip in the train carries the same noise token.
pub fn pipnoise(layout: &PipLayout, dbspl: Option<f64>, seed: u64) -> Result<SampleBuffer> {
  let mut pip = noise_template(layout.template_len(), seed, level_scale(dbspl, 1.0));
  apply_edge_ramps(&mut pip, layout.ramp_points(), RampShape::Cos2)?;
  place_pips("pip_starts", &pip, layout.starts, layout.rate, layout.duration)
}

/// Rectangular clicks of `click_duration` seconds.
pub fn clicks(rate: f64, duration: f64, dbspl: Option<f64>, click_duration: f64, starts: &[f64]) -> Result<SampleBuffer> {
  let template = vec![level_scale(dbspl, 1.0); samples_of_duration(click_duration, rate)];
  place_pips("click_starts", &template, starts, rate, duration)
}

/// How the instantaneous frequency of a sweep moves between its end points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepLaw {
  Linear,
  Logarithmic,
}

/// Phase of a sweep `tau` seconds after its onset, zero at the onset.
pub fn sweep_phase(law: SweepLaw, f0: f64, f1: f64, sweep_duration: f64, tau: f64) -> f64 {
  match law {
    SweepLaw::Linear => pi2 * (f0 * tau + 0.5 * (f1 - f0) / sweep_duration * tau * tau),
    SweepLaw::Logarithmic => {
      if f0 == f1 {
        pi2 * f0 * tau
      } else {
        let ratio = f1 / f0;
        let beta = sweep_duration / ratio.ln();
        pi2 * beta * f0 * (ratio.powf(tau / sweep_duration) - 1.0)
      }
    }
  }
}

/// A cosine chirp from `freqs[0]` at `start` to `freqs[1]` at `duration`; silent before `start`.
pub fn fmsweep(
  times: &[f64], rate: f64, start: f64, duration: f64, freqs: [f64; 2], law: SweepLaw, dbspl: Option<f64>,
) -> SampleBuffer {
  let amplitude = level_scale(dbspl, 2f64.sqrt());
  let onset = seconds_to_index(start, rate).max(0) as usize;
  let span = duration - start;
  times
    .iter()
    .enumerate()
    .map(|(i, &t)| {
      if i < onset {
        0.0
      } else {
        let tau = (t - start).max(0.0);
        amplitude * sweep_phase(law, freqs[0], freqs[1], span, tau).cos()
      }
    })
    .collect()
}

/// Noise pips under a SAM envelope referenced to `t = 0`, with linear ramps of
/// `ramp_duration` on both the noise and the envelope at the trace edges.
pub fn modnoise(
  layout: &PipLayout, times: &[f64], dbspl: Option<f64>, seed: u64, fmod: f64, dmod: f64, phase_shift: f64,
) -> Result<SampleBuffer> {
  let noise = pipnoise(layout, dbspl, seed)?;
  if noise.len() != times.len() {
    return Err(StimulusError::Generation(format!(
      "noise trace has {} samples but the time base has {}",
      noise.len(),
      times.len()
    )));
  }
  let envelope = sam_envelope(times, 0.0, fmod, dmod, phase_shift);
  let edge = samples_of_duration(layout.ramp_duration, layout.rate);
  let end = noise.len();
  let noise = linear_ramp(&noise, end, edge)?;
  let envelope = linear_ramp(&envelope, end, edge)?;
  Ok(noise.iter().zip(envelope.iter()).map(|(n, e)| n * e).collect())
}

/// Filtering applied to the quadrature noises of a band pip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandShape {
  /// Low-pass at the noise bandwidth, giving a band centred on the carrier.
  Bandpass,
  /// Band-pass between the notch and noise bandwidths, leaving a notch at the carrier.
  #[serde(rename = "BP+Notch")]
  BandpassNotch,
}

/// Narrow-band noise pips by quadrature: two independent noise pips (`seed`, `seed + 1`)
/// are shaped by `shape` and mixed onto `cos` and `sin` carriers at `centerfreq`.
pub fn noise_band(
  layout: &PipLayout, times: &[f64], dbspl: Option<f64>, seed: u64, shape: BandShape, noisebw: f64, notchbw: f64,
  centerfreq: f64,
) -> Result<SampleBuffer> {
  let first = pipnoise(layout, dbspl, seed)?;
  let second = pipnoise(layout, dbspl, seed.wrapping_add(1))?;

  let (first, second) = match shape {
    BandShape::Bandpass => {
      let lp = Cascade::lowpass(8, noisebw, layout.rate)?;
      (lp.filter(&first), lp.filter(&second))
    }
    BandShape::BandpassNotch => {
      let hp = Cascade::highpass(4, notchbw, layout.rate)?;
      let lp = Cascade::lowpass(4, noisebw, layout.rate)?;
      (lp.filter(&hp.filter(&first)), lp.filter(&hp.filter(&second)))
    }
  };

  Ok(
    izip!(times, &first, &second)
      .map(|(&t, a, b)| {
        let w = pi2 * centerfreq * t;
        a * w.cos() + b * w.sin()
      })
      .collect(),
  )
}
