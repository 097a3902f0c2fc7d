use crate::calibration::pascals_to_dbspl;
use crate::error::{Result, StimulusError};
use crate::time::seconds_to_index;

/// Identify the RMS value of a signal slice.
pub fn rms(signal: &[f64]) -> f64 {
  if signal.is_empty() {
    return 0.0;
  }
  let sum: f64 = signal.iter().map(|&x| x * x).sum();
  (sum / signal.len() as f64).sqrt()
}

/// Population standard deviation (mean removed).
pub fn std_dev(signal: &[f64]) -> f64 {
  if signal.is_empty() {
    return 0.0;
  }
  let n = signal.len() as f64;
  let mean = signal.iter().sum::<f64>() / n;
  let var = signal.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n;
  var.sqrt()
}

/// Level in dB SPL of `signal` (Pascals) between `tstart` and `tend` seconds.
pub fn measure_dbspl(signal: &[f64], rate: f64, tstart: f64, tend: f64) -> Result<f64> {
  let istart = seconds_to_index(tstart, rate);
  let iend = seconds_to_index(tend, rate);
  if istart < 0 || iend as usize > signal.len() || iend <= istart {
    return Err(StimulusError::invalid(
      "tstart/tend",
      format!(
        "window [{}s, {}s) must be non-empty and within the {}s waveform",
        tstart,
        tend,
        signal.len() as f64 / rate
      ),
    ));
  }
  Ok(pascals_to_dbspl(std_dev(&signal[istart as usize..iend as usize])))
}
