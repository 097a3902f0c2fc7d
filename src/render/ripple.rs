//! Dynamic moving ripple: a bank of log-spaced carriers under a spectro-temporal
//! envelope whose temporal modulation rate and ripple density drift slowly at random
//! (Escabi & Schreiner 2002).
//!
//! Carrier `i` is
//!
//! `w_i(t) = sin(2π f_i t + φ_i) · 10^((A/2 · sin(2π x_i RD(t) + Φ(t)) - A/2) / 20)`
//!
//! with `x_i = log2(f_i / f_base)`, `RD` the ripple density trajectory and `Φ` the
//! running integral of the temporal modulation rate trajectory.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::freq::interp;
use crate::envelope::linspace;
use crate::error::{Result, StimulusError};
use crate::render::{normalize_to, par_ordered_sum};
use crate::synth::{pi2, SampleBuffer};
use crate::synth_config::SynthConfig;
use crate::time::samples_of_duration;

/// Knobs of the ripple generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RippleSpec {
  pub seed: u64,
  /// Lowest carrier, Hz.
  pub base_freq: f64,
  pub octaves: f64,
  pub carriers_per_octave: f64,
  /// Temporal modulation rate swings over `[-max_fm_rate, max_fm_rate]` Hz.
  pub max_fm_rate: f64,
  /// Ripple density swings over `[0, max_rd]` cycles/octave.
  pub max_rd: f64,
  /// Sample rate of the modulation rate trajectory before upsampling.
  pub fm_sample_rate: f64,
  /// Sample rate of the ripple density trajectory before upsampling.
  pub rd_sample_rate: f64,
  /// Envelope depth, dB.
  pub amp: f64,
  /// Peak of the normalized output.
  pub gain: f64,
}

impl Default for RippleSpec {
  fn default() -> Self {
    RippleSpec {
      seed: 0,
      base_freq: 500.0,
      octaves: 5.0,
      carriers_per_octave: 43.0,
      max_fm_rate: 3.0,
      max_rd: 6.0,
      fm_sample_rate: 3.0,
      rd_sample_rate: 6.0,
      amp: 45.0,
      gain: 0.5,
    }
  }
}

impl RippleSpec {
  /// Carrier frequencies `base · 2^linspace(0, octaves, floor(carriers_per_octave · octaves))`.
  pub fn carrier_freqs(&self) -> Vec<f64> {
    let count = (self.carriers_per_octave * self.octaves).floor().max(0.0) as usize;
    linspace(0.0, self.octaves, count).iter().map(|x| self.base_freq * 2f64.powf(*x)).collect()
  }
}

/// Quantities shared read-only by every carrier.
#[derive(Debug, Clone)]
pub struct Trajectories {
  /// Integrated modulation rate, radians per 2π.
  pub phase: Vec<f64>,
  /// Instantaneous ripple density, cycles/octave.
  pub density: Vec<f64>,
  /// Carriers below Nyquist, ascending.
  pub carriers: Vec<f64>,
  /// Static phase per carrier in `carriers`.
  pub carrier_phases: Vec<f64>,
}

/// Points of a trajectory sampled at `rate` over `duration`, at least two so it can be interpolated.
fn trajectory_points(duration: f64, rate: f64) -> usize {
  samples_of_duration(duration, rate).max(2)
}

/// Draws the random trajectories and the carrier bank for a trace of `times` at `rate`.
///
/// Draw order from the seeded generator: modulation rate points, ripple density
/// points, then one phase per carrier of the full bank.
pub fn derive(spec: &RippleSpec, times: &[f64], rate: f64, duration: f64) -> Result<Trajectories> {
  let mut rng = StdRng::seed_from_u64(spec.seed);

  let n_fm = trajectory_points(duration, spec.fm_sample_rate);
  let n_rd = trajectory_points(duration, spec.rd_sample_rate);
  let fm_points: Vec<f64> = (0..n_fm).map(|_| rng.gen::<f64>()).collect();
  let rd_points: Vec<f64> = (0..n_rd).map(|_| rng.gen::<f64>()).collect();

  let fm = interp(times, &linspace(0.0, duration, n_fm), &fm_points);
  let mut phase = Vec::with_capacity(fm.len());
  let mut running = 0.0;
  for u in fm {
    running += u * spec.max_fm_rate * 2.0 - spec.max_fm_rate;
    phase.push(running / rate);
  }

  let density: Vec<f64> =
    interp(times, &linspace(0.0, duration, n_rd), &rd_points).iter().map(|u| u * spec.max_rd).collect();

  let bank = spec.carrier_freqs();
  let bank_phases: Vec<f64> = (0..bank.len()).map(|_| rng.gen::<f64>() * pi2).collect();

  let nyquist = rate / 2.0;
  let (carriers, carrier_phases): (Vec<f64>, Vec<f64>) =
    bank.iter().zip(bank_phases.iter()).filter(|(f, _)| **f < nyquist).map(|(f, p)| (*f, *p)).unzip();
  if carriers.len() < bank.len() {
    debug!("dropped {} ripple carriers at or above {} Hz", bank.len() - carriers.len(), nyquist);
  }
  if carriers.is_empty() {
    return Err(StimulusError::invalid(
      "base_freq",
      format!("no ripple carrier from {} Hz lies below Nyquist ({} Hz)", spec.base_freq, nyquist),
    ));
  }

  Ok(Trajectories { phase, density, carriers, carrier_phases })
}

/// Waveform of carrier `index`.
pub fn carrier(spec: &RippleSpec, trajectories: &Trajectories, times: &[f64], index: usize) -> Result<SampleBuffer> {
  let freq = trajectories.carriers[index];
  let start_phase = trajectories.carrier_phases[index];
  let log_freq = (freq / spec.base_freq).log2();
  let half_depth = spec.amp / 2.0;

  let mut wave = Vec::with_capacity(times.len());
  for (i, &t) in times.iter().enumerate() {
    let envelope_db = half_depth * (pi2 * log_freq * trajectories.density[i] + trajectories.phase[i]).sin() - half_depth;
    let sample = (pi2 * freq * t + start_phase).sin() * 10f64.powf(envelope_db / 20.0);
    if !sample.is_finite() {
      return Err(StimulusError::Generation(format!("ripple carrier {} ({} Hz) is not finite at sample {}", index, freq, i)));
    }
    wave.push(sample);
  }
  Ok(wave)
}

/// Full ripple trace: derive trajectories, sum every carrier in index order, normalize to `gain`.
pub fn synthesize(
  spec: &RippleSpec, times: &[f64], rate: f64, duration: f64, config: &SynthConfig,
) -> Result<SampleBuffer> {
  let trajectories = derive(spec, times, rate, duration)?;
  let count = trajectories.carriers.len();
  info!("rendering dynamic ripple: {} carriers, {} samples", count, times.len());

  let mut total = par_ordered_sum(count, times.len(), config, |i| carrier(spec, &trajectories, times, i))?;
  normalize_to(&mut total, spec.gain)?;
  Ok(total)
}
