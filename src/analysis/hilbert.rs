use rustfft::num_complex::Complex64;
use rustfft::num_traits::Zero;
use rustfft::FftPlanner;

/// Analytic signal via the FFT: keep DC (and Nyquist for even lengths), double the
/// positive frequencies, zero the negative ones, and transform back.
pub fn analytic_signal(input: &[f64]) -> Vec<Complex64> {
  let n = input.len();
  if n == 0 {
    return vec![];
  }

  let mut planner = FftPlanner::<f64>::new();
  let fft = planner.plan_fft_forward(n);
  let ifft = planner.plan_fft_inverse(n);

  let mut x: Vec<Complex64> = input.iter().map(|&v| Complex64::new(v, 0.0)).collect();
  fft.process(&mut x);

  let half = n / 2;
  for (i, bin) in x.iter_mut().enumerate() {
    if i == 0 || (n % 2 == 0 && i == half) {
      continue;
    } else if i <= (n - 1) / 2 {
      *bin *= 2.0;
    } else {
      *bin = Complex64::zero();
    }
  }

  ifft.process(&mut x);

  // rustfft does not scale the inverse
  let scale = 1.0 / n as f64;
  x.iter_mut().for_each(|xi| *xi *= scale);
  x
}

/// Magnitude of the analytic signal.
pub fn envelope(input: &[f64]) -> Vec<f64> {
  analytic_signal(input).iter().map(|c| c.norm()).collect()
}
