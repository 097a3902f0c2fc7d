//! Signal measurement and conditioning used by the generators: level measurement,
//! analytic envelopes, Butterworth filtering, interpolation and resampling.

pub mod freq;
pub mod hilbert;
pub mod sampler;
pub mod volume;

/// Largest absolute sample value; 0 for an empty signal.
pub fn peak(signal: &[f64]) -> f64 {
  signal.iter().map(|&sample| sample.abs()).fold(0.0, f64::max)
}
