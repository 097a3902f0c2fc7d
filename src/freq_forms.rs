//! Generation of stimulus waveforms in the frequency domain: spectrally matched noise.

use log::debug;
use rand::Rng;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::analysis::freq::Cascade;
use crate::analysis::hilbert;
use crate::analysis::sampler::resample;
use crate::error::{Result, StimulusError};
use crate::synth::{pi2, SampleBuffer};

/// Cutoff of the low-pass applied to a reference envelope before it is reimposed.
pub const ENVELOPE_CUTOFF_HZ: f64 = 50.0;
const ENVELOPE_ORDER: usize = 6;

/// Smallest power of two not below `n` (1 for an empty signal).
pub fn next_pow_2(n: usize) -> usize {
  n.max(1).next_power_of_two()
}

/// Noise with the magnitude spectrum of `x` and phases drawn uniformly from `[0, 2π)`.
///
/// The spectrum is taken over `x` zero padded to the next power of two; the noise is
/// truncated back to `x.len()`. With `keep_env`, the noise is multiplied by the 50 Hz
/// low-passed magnitude of the analytic signal of `x`.
pub fn noise_from_signal<R: Rng>(x: &[f64], fs: f64, keep_env: bool, rng: &mut R) -> Result<SampleBuffer> {
  let n_x = x.len();
  if n_x == 0 {
    return Ok(vec![]);
  }
  let n_fft = next_pow_2(n_x);
  let half = n_fft / 2;

  let mut planner = FftPlanner::<f64>::new();
  let fft = planner.plan_fft_forward(n_fft);
  let ifft = planner.plan_fft_inverse(n_fft);

  let mut spectrum: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
  spectrum.resize(n_fft, Complex64::new(0.0, 0.0));
  fft.process(&mut spectrum);

  // one random phase per non-negative bin, mirrored for a real result
  for k in 0..=half {
    let magnitude = spectrum[k].norm();
    let theta: f64 = pi2 * rng.gen::<f64>();
    let bin = if k == 0 || (n_fft % 2 == 0 && k == half) {
      // DC and Nyquist stay real, keeping only the sign of the drawn phase
      Complex64::new(magnitude * theta.cos().signum(), 0.0)
    } else {
      Complex64::from_polar(magnitude, theta)
    };
    spectrum[k] = bin;
    if k != 0 && k != n_fft - k {
      spectrum[n_fft - k] = bin.conj();
    }
  }
  ifft.process(&mut spectrum);

  let scale = 1.0 / n_fft as f64;
  let mut out: SampleBuffer = spectrum[..n_x].iter().map(|c| c.re * scale).collect();

  if keep_env {
    let lp = Cascade::lowpass(ENVELOPE_ORDER, ENVELOPE_CUTOFF_HZ, fs)?;
    let env = lp.filtfilt(&hilbert::envelope(x));
    out.iter_mut().zip(env.iter()).for_each(|(o, e)| *o *= e);
  }
  Ok(out)
}

/// Speech-shaped noise from a reference recording sampled at `samplingrate`.
///
/// The reference is resampled to `rate`, scaled so its maximum is 2, and replaced by
/// spectrally matched noise. The result is fitted to `num_samples`, zero padded when the
/// reference is shorter.
pub fn make_ssn<R: Rng>(
  rate: f64, num_samples: usize, waveform: &[f64], samplingrate: f64, keep_env: bool, rng: &mut R,
) -> Result<SampleBuffer> {
  let reference = if rate != samplingrate {
    resample(waveform, samplingrate as usize, rate as usize)?
  } else {
    waveform.to_vec()
  };

  let peak = reference.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  if peak.is_nan() || peak <= 0.0 {
    return Err(StimulusError::invalid("waveform", "reference waveform must have a positive maximum"));
  }
  let reference: Vec<f64> = reference.iter().map(|&v| 2.0 * v / peak).collect();
  debug!("speech-shaped noise from a {} sample reference at {} Hz", reference.len(), rate);

  let mut noise = noise_from_signal(&reference, rate, keep_env, rng)?;
  noise.resize(num_samples, 0.0);
  Ok(noise)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::volume::rms;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn magnitudes(x: &[f64], n: usize) -> Vec<f64> {
    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    buf.resize(n, Complex64::new(0.0, 0.0));
    FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buf);
    buf.iter().map(|c| c.norm()).collect()
  }

  #[test]
  fn test_next_pow_2() {
    assert_eq!(next_pow_2(1000), 1024);
    assert_eq!(next_pow_2(1024), 1024);
    assert_eq!(next_pow_2(0), 1);
  }

  #[test]
  fn matched_noise_keeps_the_magnitude_spectrum() {
    // power-of-two length, so nothing is truncated and magnitudes carry over exactly
    let x: Vec<f64> = (0..256).map(|i| ((i * 37 % 101) as f64 / 50.0) - 1.0).collect();
    let mut rng = StdRng::seed_from_u64(11);
    let noise = noise_from_signal(&x, 10000.0, false, &mut rng).unwrap();
    assert_eq!(noise.len(), 256);
    let want = magnitudes(&x, 256);
    let got = magnitudes(&noise, 256);
    for (w, g) in want.iter().zip(got.iter()) {
      assert!((w - g).abs() < 1e-9 * want[0].max(1.0), "{} vs {}", w, g);
    }
    assert_ne!(noise, x);
  }

  #[test]
  fn matched_noise_is_seeded() {
    let x: Vec<f64> = (0..300).map(|i| (i as f64 * 0.1).sin()).collect();
    let a = noise_from_signal(&x, 8000.0, true, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = noise_from_signal(&x, 8000.0, true, &mut StdRng::seed_from_u64(5)).unwrap();
    let c = noise_from_signal(&x, 8000.0, true, &mut StdRng::seed_from_u64(6)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn kept_envelope_of_a_steady_tone_does_not_fade_at_the_edges() {
    let fs = 16000.0;
    let tone: Vec<f64> = (0..16000).map(|i| (pi2 * 1000.0 * i as f64 / fs).sin()).collect();
    let plain = noise_from_signal(&tone, fs, false, &mut StdRng::seed_from_u64(9)).unwrap();
    let shaped = noise_from_signal(&tone, fs, true, &mut StdRng::seed_from_u64(9)).unwrap();
    for window in [0..160, 15840..16000] {
      let ratio = rms(&shaped[window.clone()]) / rms(&plain[window]);
      assert!((ratio - 1.0).abs() < 0.01, "edge gain {}", ratio);
    }
  }

  #[test]
  fn speech_shaped_noise_is_fitted_to_the_trace() {
    let reference: Vec<f64> = (0..500).map(|i| (i as f64 * 0.05).sin()).collect();
    let mut rng = StdRng::seed_from_u64(1);
    let longer = make_ssn(10000.0, 800, &reference, 10000.0, true, &mut rng).unwrap();
    assert_eq!(longer.len(), 800);
    assert!(longer[500..].iter().all(|&x| x == 0.0));
    let shorter = make_ssn(10000.0, 200, &reference, 10000.0, false, &mut rng).unwrap();
    assert_eq!(shorter.len(), 200);
  }

  #[test]
  fn silent_reference_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(make_ssn(10000.0, 10, &[0.0; 10], 10000.0, true, &mut rng).is_err());
  }
}
