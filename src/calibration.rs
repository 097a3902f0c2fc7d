//! Sound pressure calibration: dB SPL to Pascals and back.
//!
//! Only the level relationship against a fixed reference pressure is modelled here.
//! Mapping Pascals to a given transducer's output is the playback side's concern.

use crate::synth::REFERENCE_PRESSURE;

/// `reference * 10^(level / 20)`.
pub fn dbspl_to_pascals_ref(dbspl: f64, reference: f64) -> f64 {
  reference * 10f64.powf(dbspl / 20.0)
}

/// `20 * log10(pressure / reference)`.
pub fn pascals_to_dbspl_ref(pascals: f64, reference: f64) -> f64 {
  20.0 * (pascals / reference).log10()
}

/// Converts a level in dB SPL to an rms pressure in Pascals (20 µPa reference).
pub fn dbspl_to_pascals(dbspl: f64) -> f64 {
  dbspl_to_pascals_ref(dbspl, REFERENCE_PRESSURE)
}

/// Converts an rms pressure in Pascals to dB SPL (20 µPa reference).
pub fn pascals_to_dbspl(pascals: f64) -> f64 {
  pascals_to_dbspl_ref(pascals, REFERENCE_PRESSURE)
}

/// Scale factor for a generator: the calibrated pressure times `factor`, or unity when
/// no level was requested (raw amplitude output).
pub fn level_scale(dbspl: Option<f64>, factor: f64) -> f64 {
  match dbspl {
    Some(level) => factor * dbspl_to_pascals(level),
    None => 1.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_level_is_zero_db() {
    assert_eq!(pascals_to_dbspl(REFERENCE_PRESSURE), 0.0);
    assert_eq!(dbspl_to_pascals(0.0), REFERENCE_PRESSURE);
  }

  #[test]
  fn ninety_four_db_is_about_one_pascal() {
    assert!((dbspl_to_pascals(94.0) - 1.0024).abs() < 1e-3);
  }

  #[test]
  fn conversion_is_invertible() {
    let mut level = 0.0;
    while level <= 140.0 {
      let back = pascals_to_dbspl(dbspl_to_pascals(level));
      let tolerance = 1e-9 * level.abs().max(1.0);
      assert!((back - level).abs() <= tolerance, "{} -> {}", level, back);
      level += 0.5;
    }
  }

  #[test]
  fn absent_level_leaves_raw_amplitude() {
    assert_eq!(level_scale(None, 2f64.sqrt()), 1.0);
    assert!((level_scale(Some(0.0), 2.0) - 2.0 * REFERENCE_PRESSURE).abs() < 1e-18);
  }
}
