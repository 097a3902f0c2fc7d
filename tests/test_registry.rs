mod common;

use audstim::render::engrave;
use audstim::{create, variants, Descriptor, StimulusError};
use serde_json::json;

#[test]
fn descriptor_rebuilds_an_identical_waveform() {
  for (name, params) in [
    ("TonePip", common::tone_pip()),
    ("NoisePip", common::noise_pip(9)),
    ("ComodulationMasking", common::cmr(2, "Signal")),
    ("DynamicRipple", common::ripple()),
  ] {
    let original = create(name, &params).unwrap();
    let descriptor = original.descriptor().unwrap();
    assert_eq!(descriptor.variant, name);
    let rebuilt = descriptor.create().unwrap();
    assert_eq!(rebuilt.descriptor().unwrap(), descriptor);
    assert_eq!(original.waveform().unwrap(), rebuilt.waveform().unwrap(), "{}", name);
  }
}

#[test]
fn descriptor_survives_json_text() {
  let original = create("DynamicRipple", &common::ripple()).unwrap();
  let text = serde_json::to_string(&original.descriptor().unwrap()).unwrap();
  let descriptor: Descriptor = serde_json::from_str(&text).unwrap();
  assert_eq!(descriptor, original.descriptor().unwrap());
  assert_eq!(descriptor.parameters["carriers_per_octave"], json!(43.0));
  assert_eq!(descriptor.create().unwrap().waveform().unwrap(), original.waveform().unwrap());
}

#[test]
fn descriptor_fills_in_defaults() {
  let descriptor = create("ComodulationMasking", &common::cmr(1, "Target")).unwrap().descriptor().unwrap();
  assert_eq!(descriptor.parameters["seed"], json!(0));
  assert_eq!(descriptor.parameters["flanking_type"], json!("MultiTone"));
  assert_eq!(descriptor.parameters["output"], json!("Target"));
}

#[test]
fn unknown_variant_is_unsupported() {
  assert!(!variants().contains(&"WhiteNoise"));
  let descriptor = Descriptor { variant: "WhiteNoise".to_string(), parameters: common::tone_pip() };
  assert!(matches!(descriptor.create(), Err(StimulusError::UnsupportedVariant(_))));
}

#[test]
fn missing_and_invalid_parameters_are_named() {
  let mut params = common::tone_pip();
  params.remove("ramp_duration");
  match create("TonePip", &params) {
    Err(StimulusError::MissingParameter { name, .. }) => assert_eq!(name, "ramp_duration"),
    other => panic!("expected a missing parameter, got {:?}", other.map(|s| s.name())),
  }

  let mut params = common::tone_pip();
  params.insert("f0".to_string(), json!(6000.0));
  match create("TonePip", &params) {
    Err(StimulusError::InvalidParameter { name, .. }) => assert_eq!(name, "f0"),
    other => panic!("expected an invalid parameter, got {:?}", other.map(|s| s.name())),
  }

  let mut params = common::tone_pip();
  params.insert("ramp_duration".to_string(), json!(0.003));
  match create("TonePip", &params) {
    Err(StimulusError::InvalidParameter { name, .. }) => assert_eq!(name, "pip_duration"),
    other => panic!("expected an invalid parameter, got {:?}", other.map(|s| s.name())),
  }
}

#[test]
fn bad_option_lists_the_allowed_values() {
  let err = create("ComodulationMasking", &common::cmr(1, "Everything")).err().unwrap();
  match err {
    StimulusError::InvalidParameter { name, reason } => {
      assert_eq!(name, "output");
      assert!(reason.contains("Target+OFM"));
    }
    other => panic!("unexpected {:?}", other),
  }
}

#[test]
fn rendered_wav_holds_the_waveform() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(common::test_audio_name("TonePip", 10000.0));
  let path = path.to_str().unwrap();
  let stim = create("TonePip", &common::tone_pip()).unwrap();
  engrave::waveform(stim.sample_rate(), stim.waveform().unwrap(), path).unwrap();

  let mut reader = hound::WavReader::open(path).unwrap();
  assert_eq!(reader.spec().sample_rate, 10000);
  let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
  let expected: Vec<f32> = stim.waveform().unwrap().iter().map(|&x| x as f32).collect();
  assert_eq!(read, expected);
}

#[test]
fn speech_shaped_noise_keeps_the_envelope_unless_told_not_to() {
  let shaped = create("SpeechShapedNoise", &common::speech_shaped(json!({}))).unwrap();
  assert_eq!(shaped.descriptor().unwrap().parameters["keep_env"], json!(true));
  let flat = create("SpeechShapedNoise", &common::speech_shaped(json!({"keep_env": false}))).unwrap();
  assert_eq!(flat.descriptor().unwrap().parameters["keep_env"], json!(false));

  let shaped = shaped.waveform().unwrap();
  let flat = flat.waveform().unwrap();
  assert_eq!(shaped.len(), 8000);
  assert_ne!(shaped, flat);

  // the reference falls silent at 0.25 s; only the shaped noise follows it
  let (on, off) = (800..3200, 5280..6720);
  assert!(common::rms(&shaped[off.clone()]) < 0.05 * common::rms(&shaped[on.clone()]));
  assert!(common::rms(&flat[off]) > 0.5 * common::rms(&flat[on]));
}
