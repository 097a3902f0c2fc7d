use std::env;
use std::thread;

use log::debug;
use once_cell::sync::Lazy;
use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Cores under half load, sampled once per process. Usage is a difference between two
/// refreshes, so the first reading waits out the minimum update interval.
static IDLE_CORES: Lazy<usize> = Lazy::new(|| {
  let mut sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()));
  thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
  sys.refresh_cpu_usage();
  let idle = sys.cpus().iter().filter(|cpu| cpu.cpu_usage() < 50.0).count().max(1);
  debug!("{} of {} cores idle", idle, sys.cpus().len());
  idle
});

/// Engine knobs that decide how work is scheduled, never what is computed.
///
/// Changing any of these values must leave every waveform bit-identical.
#[derive(Debug, Clone)]
pub struct SynthConfig {
  /// Upper bound on the worker pool used by the carrier-bank synthesizer.
  pub max_par_threads: Option<usize>,
  /// Number of carriers materialized per parallel batch before folding into the sum.
  pub carrier_batch: usize,
}

impl Default for SynthConfig {
  fn default() -> Self {
    SynthConfig { max_par_threads: None, carrier_batch: 64 }
  }
}

impl SynthConfig {
  pub fn new(max_par_threads: Option<usize>, carrier_batch: usize) -> SynthConfig {
    SynthConfig { max_par_threads, carrier_batch: carrier_batch.max(1) }
  }

  /// Reads `MAX_PAR_THREADS` and `CARRIER_BATCH`; unset or unparsable values fall back to defaults.
  pub fn from_env() -> SynthConfig {
    let defaults = SynthConfig::default();
    let max_par_threads = env::var("MAX_PAR_THREADS").ok().and_then(|val| val.parse::<usize>().ok());
    let carrier_batch = env::var("CARRIER_BATCH")
      .ok()
      .and_then(|val| val.parse::<usize>().ok())
      .unwrap_or(defaults.carrier_batch);
    SynthConfig::new(max_par_threads, carrier_batch)
  }

  /// Worker pool size: hardware concurrency, reduced to idle cores, capped by `max_par_threads`.
  pub fn worker_count(&self) -> usize {
    let available_threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

    let actual_available_threads = available_threads.min(*IDLE_CORES);
    let num_threads = match self.max_par_threads {
      Some(cap) => actual_available_threads.min(cap),
      None => actual_available_threads,
    };
    num_threads.max(1)
  }
}
