//! Failure taxonomy shared by construction, generation and export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StimulusError {
  /// A parameter the variant requires was not supplied.
  #[error("{variant}: missing required parameter '{name}'")]
  MissingParameter { variant: String, name: String },

  /// A supplied parameter violates a documented constraint.
  #[error("invalid parameter '{name}': {reason}")]
  InvalidParameter { name: String, reason: String },

  /// A template placed at `start` would write past the end of the buffer.
  #[error(
    "'{name}' entry at {start}s with a {length}s template extends beyond the allotted stimulus duration ({duration}s)"
  )]
  Boundary { name: String, start: f64, length: f64, duration: f64 },

  /// Unknown variant name, or a known variant's sub-option with no implementation.
  #[error("unsupported: {0}")]
  UnsupportedVariant(String),

  #[error("generation failed: {0}")]
  Generation(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("wav export failed: {0}")]
  Wav(#[from] hound::Error),

  #[error("descriptor encoding failed: {0}")]
  Json(#[from] serde_json::Error),
}

impl StimulusError {
  pub fn missing(variant: &str, name: &str) -> Self {
    StimulusError::MissingParameter { variant: variant.to_string(), name: name.to_string() }
  }

  pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
    StimulusError::InvalidParameter { name: name.to_string(), reason: reason.into() }
  }
}

pub type Result<T> = std::result::Result<T, StimulusError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_parameter() {
    let err = StimulusError::invalid("f0", "must be less than rate / 2 (5000 Hz)");
    assert_eq!(err.to_string(), "invalid parameter 'f0': must be less than rate / 2 (5000 Hz)");

    let err = StimulusError::missing("TonePip", "ramp_duration");
    assert!(err.to_string().contains("ramp_duration"));
    assert!(err.to_string().contains("TonePip"));
  }

  #[test]
  fn boundary_message_carries_start_and_duration() {
    let err = StimulusError::Boundary { name: "click_starts".into(), start: 0.1, length: 0.001, duration: 0.1 };
    let msg = err.to_string();
    assert!(msg.contains("click_starts"));
    assert!(msg.contains("0.1s"));
  }
}
