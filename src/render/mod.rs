pub mod engrave;
pub mod ripple;

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::error::{Result, StimulusError};
use crate::synth::SampleBuffer;
use crate::synth_config::SynthConfig;

/// Scales `buffer` so its largest absolute sample equals `gain`.
///
/// A silent or non-finite buffer cannot be normalized and is reported as a generation failure.
pub fn normalize_to(buffer: &mut [f64], gain: f64) -> Result<()> {
  let max_amplitude = crate::analysis::peak(buffer);
  if max_amplitude == 0.0 || !max_amplitude.is_finite() {
    return Err(StimulusError::Generation(format!("cannot normalize a buffer with peak {}", max_amplitude)));
  }
  buffer.iter_mut().for_each(|sample| *sample = gain * *sample / max_amplitude);
  Ok(())
}

/// Computes `count` buffers of `len` samples with `render` and sums them in index order.
///
/// Buffers are rendered in parallel batches of `config.carrier_batch` on a pool of
/// `config.worker_count()` threads. Each batch is collected in index order before it is
/// folded into the total, so the sum is the same for every pool size and batch size.
/// The first failing index aborts the whole sum.
pub fn par_ordered_sum<F>(count: usize, len: usize, config: &SynthConfig, render: F) -> Result<SampleBuffer>
where
  F: Fn(usize) -> Result<SampleBuffer> + Sync + Send,
{
  let num_threads = config.worker_count();
  let batch = config.carrier_batch.max(1);
  debug!("summing {} buffers of {} samples on {} threads, {} per batch", count, len, num_threads, batch);

  let pool = ThreadPoolBuilder::new()
    .num_threads(num_threads)
    .build()
    .map_err(|e| StimulusError::Generation(format!("could not start worker pool: {}", e)))?;

  let mut total = vec![0f64; len];
  let mut first = 0;
  while first < count {
    let last = (first + batch).min(count);
    let rendered: Vec<Result<SampleBuffer>> = pool.install(|| (first..last).into_par_iter().map(&render).collect());
    for (index, result) in (first..last).zip(rendered) {
      let buffer = result?;
      if buffer.len() != len {
        return Err(StimulusError::Generation(format!(
          "buffer {} has {} samples, expected {}",
          index,
          buffer.len(),
          len
        )));
      }
      total.iter_mut().zip(buffer.iter()).for_each(|(t, s)| *t += s);
    }
    first = last;
  }
  Ok(total)
}
