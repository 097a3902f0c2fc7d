//! Calibrated auditory stimulus synthesis.
//!
//! Stimuli are requested by variant name and parameter mapping through [`registry::create`],
//! validated on construction, and generate their waveform (in Pascals when a level is
//! given) the first time it is read.

pub mod analysis;
pub mod calibration;
pub mod envelope;
pub mod error;
pub mod files;
pub mod freq_forms;
pub mod modulate;
pub mod registry;
pub mod render;
pub mod sequence;
pub mod stimulus;
pub mod synth;
pub mod synth_config;
pub mod time;
pub mod time_forms;

pub use error::{Result, StimulusError};
pub use registry::{create, variants};
pub use stimulus::{Descriptor, ParamMap, Stimulus, StimulusParams};
pub use synth_config::SynthConfig;
