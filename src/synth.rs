#![allow(non_upper_case_globals)]
//! Numeric conventions shared by every generator.
//!
//! Synthesis runs at f64 precision end to end; sample buffers hold Pascals when a
//! level is requested and raw amplitude otherwise.

pub const pi: f64 = std::f64::consts::PI;
pub const pi2: f64 = pi * 2f64;
pub const pi_2: f64 = std::f64::consts::FRAC_PI_2;

/// Reference pressure for dB SPL, in Pascals (20 µPa).
pub const REFERENCE_PRESSURE: f64 = 20e-6;

/// Slack applied before flooring a time-times-rate product, so that values such as
/// `0.3 * 10000.0 = 2999.9999999999995` land on the sample the caller meant.
pub const INDEX_EPSILON: f64 = 1e-9;

/// Sample values, in Pascals or raw units.
pub type SampleBuffer = Vec<f64>;

/// Sample values in 0 to 1 (ramps) or 0 to 2 (modulation envelopes).
pub type RangeBuffer = Vec<f64>;
