use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use audstim::render::engrave;
use audstim::{variants, Descriptor};

/// Render and inspect calibrated auditory stimuli described in JSON.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List the stimulus variants that can be built
  Variants,
  /// Write a descriptor's waveform to a 32-bit float WAV file
  Render { descriptor: PathBuf, out: PathBuf },
  /// Print the level in dB SPL of a window of the waveform
  Measure {
    descriptor: PathBuf,
    /// Window start, seconds
    #[clap(long, default_value = "0")]
    start: f64,
    /// Window end, seconds; defaults to the end of the trace
    #[clap(long)]
    end: Option<f64>,
  },
  /// Print the descriptor with every default filled in
  Describe { descriptor: PathBuf },
}

fn load_descriptor(path: &Path) -> Result<Descriptor> {
  let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("parsing descriptor {}", path.display()))
}

fn main() -> Result<()> {
  dotenv::dotenv().ok();
  env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));

  match Args::parse().command {
    Command::Variants => {
      for name in variants() {
        println!("{}", name);
      }
    }
    Command::Render { descriptor, out } => {
      let stim = load_descriptor(&descriptor)?.create()?;
      let out = out.to_str().with_context(|| format!("output path {} is not UTF-8", out.display()))?;
      engrave::waveform(stim.sample_rate(), stim.waveform()?, out)?;
      println!("{}", out);
    }
    Command::Measure { descriptor, start, end } => {
      let stim = load_descriptor(&descriptor)?.create()?;
      let end = end.unwrap_or_else(|| stim.duration());
      info!("measuring {} from {}s to {}s", stim.name(), start, end);
      println!("{:.3}", stim.measure_dbspl(start, end)?);
    }
    Command::Describe { descriptor } => {
      let stim = load_descriptor(&descriptor)?.create()?;
      println!("{}", serde_json::to_string_pretty(&stim.descriptor()?)?);
    }
  }
  Ok(())
}
