#![allow(dead_code)]
use audstim::ParamMap;
use serde_json::{json, Value};

pub const TEST_AUDIO_DIR: &str = "test-render";

pub fn test_audio_name(variant: &str, rate: f64) -> String {
  format!("{}/{}_sample-rate_{}.wav", TEST_AUDIO_DIR, variant, rate)
}

pub fn params(value: Value) -> ParamMap {
  match value {
    Value::Object(map) => map,
    other => panic!("parameters must be an object, got {}", other),
  }
}

pub fn tone_pip() -> ParamMap {
  params(json!({
    "rate": 10000.0,
    "duration": 0.01,
    "f0": 1000.0,
    "dbspl": null,
    "pip_duration": 0.005,
    "pip_starts": [0.0],
    "ramp_duration": 0.001
  }))
}

pub fn noise_pip(seed: u64) -> ParamMap {
  params(json!({
    "rate": 20000.0,
    "duration": 0.1,
    "dbspl": 70.0,
    "pip_duration": 0.05,
    "pip_starts": [0.01, 0.04],
    "ramp_duration": 0.005,
    "seed": seed
  }))
}

pub fn click_train(starts: Value) -> ParamMap {
  params(json!({
    "rate": 10000.0,
    "duration": 0.05,
    "dbspl": 80.0,
    "click_duration": 0.0002,
    "click_starts": starts
  }))
}

pub fn cmr(bands: usize, output: &str) -> ParamMap {
  params(json!({
    "rate": 40000.0,
    "duration": 0.5,
    "masker_spl": 40.0,
    "target_spl": 30.0,
    "masker_delay": 0.05,
    "masker_duration": 0.3,
    "target_f0": 4000.0,
    "masker_f0": null,
    "target_duration": 0.2,
    "target_delay": 0.15,
    "fmod": 10.0,
    "dmod": 100.0,
    "ramp_duration": 0.01,
    "flanking_type": "MultiTone",
    "flanking_spacing": 1.0,
    "flanking_phase": "Codeviant",
    "flanking_bands": bands,
    "output": output
  }))
}

pub fn ripple() -> ParamMap {
  params(json!({"rate": 8000.0, "duration": 0.05}))
}

pub fn peak(wave: &[f64]) -> f64 {
  wave.iter().fold(0.0f64, |m, x| m.max(x.abs()))
}

/// Half a second at 16 kHz whose reference is a 1 kHz tone for the first half and silence after.
pub fn speech_shaped(extra: Value) -> ParamMap {
  let rate = 16000.0;
  let reference: Vec<f64> = (0..8000)
    .map(|i| if i < 4000 { (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / rate).sin() } else { 0.0 })
    .collect();
  let mut map = params(json!({
    "rate": rate,
    "duration": 0.5,
    "waveform": reference,
    "samplingrate": rate,
    "seed": 4
  }));
  map.extend(params(extra));
  map
}

pub fn rms(wave: &[f64]) -> f64 {
  (wave.iter().map(|x| x * x).sum::<f64>() / wave.len() as f64).sqrt()
}
