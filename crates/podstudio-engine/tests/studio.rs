//! The editor-facing facade, including an offline bounce through real WAV files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use podstudio_config::StudioConfig;
use podstudio_core::{GraphError, NodeParams, ResolveError};
use podstudio_engine::{PlayError, PlaybackEvent, Status, Studio};
use podstudio_io::{CpalBackend, MemoryBackend, SignalSpec, read_wav, write_wav};
use podstudio_registry::EffectRegistry;
use tempfile::tempdir;

fn memory_studio(backend: &MemoryBackend) -> Studio {
    Studio::new(
        Arc::new(backend.clone()),
        Arc::new(EffectRegistry::new()),
        &StudioConfig::default(),
    )
}

#[test]
fn edits_are_validated_against_the_registry() {
    let backend = MemoryBackend::new();
    let mut studio = memory_studio(&backend);
    let input = studio.add_input_node();
    let fx = studio.add_effect_node("reverb");
    let output = studio.add_output_node();

    assert!(matches!(
        studio.set_parameters(fx, NodeParams::effect("reverb", ["150"])),
        Err(GraphError::InvalidParameters { .. })
    ));
    assert!(matches!(
        studio.set_parameters(fx, NodeParams::effect("chorus", Vec::<String>::new())),
        Err(GraphError::InvalidParameters { .. })
    ));
    studio
        .set_parameters(fx, NodeParams::effect("reverb", ["50", "20"]))
        .unwrap();

    assert!(matches!(
        studio.connect(output, input),
        Err(GraphError::InvalidLink { .. })
    ));
    studio.connect(input, fx).unwrap();
    studio.connect(fx, output).unwrap();
    assert_eq!(studio.disconnect(fx), Ok(Some(output)));
    assert_eq!(studio.graph().len(), 3);
}

#[test]
fn two_unconnected_inputs_report_no_output_for_the_first() {
    let backend = MemoryBackend::new();
    let mut studio = memory_studio(&backend);
    let first = studio.add_input_node();
    let second = studio.add_input_node();
    studio.set_parameters(first, NodeParams::input("a.wav")).unwrap();
    studio.set_parameters(second, NodeParams::input("b.wav")).unwrap();

    let err = studio.play().unwrap_err();
    assert!(matches!(
        err,
        PlayError::Resolve(ResolveError::NoOutput { input }) if input == first
    ));
    assert_eq!(studio.status(), Status::Idle);
}

#[test]
fn effect_menu_honours_configured_length() {
    let backend = MemoryBackend::new();
    let mut config = StudioConfig::default();
    config.menu.effect_entries = 2;
    let studio = Studio::new(
        Arc::new(backend),
        Arc::new(EffectRegistry::new()),
        &config,
    );
    let names: Vec<_> = studio.effect_menu().iter().map(|d| d.name).collect();
    assert_eq!(names, ["vol", "gain"]);
    assert!(studio.accepts_source(Path::new("take1.wav")));
    assert!(!studio.accepts_source(Path::new("take1.flac")));
}

#[test]
fn bounce_wav_through_gain_to_wav_device() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("a.wav");
    let dst = dir.path().join("bounced.wav");
    let spec = SignalSpec::new(22050, 2);
    let samples: Vec<f32> = (0..4000).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
    write_wav(&src, &samples, spec).unwrap();

    let mut studio = Studio::new(
        Arc::new(CpalBackend::default()),
        Arc::new(EffectRegistry::new()),
        &StudioConfig::default(),
    );
    let events = studio.events();
    let input = studio.add_input_node();
    let fx = studio.add_effect_node("gain");
    let output = studio.add_output_node();
    studio
        .set_parameters(input, NodeParams::input(src.to_str().unwrap()))
        .unwrap();
    studio
        .set_parameters(fx, NodeParams::effect("gain", ["-6"]))
        .unwrap();
    studio
        .set_parameters(output, NodeParams::output(dst.to_str().unwrap()))
        .unwrap();
    studio.connect(input, fx).unwrap();
    studio.connect(fx, output).unwrap();

    studio.play().unwrap();
    let terminal = loop {
        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            PlaybackEvent::Started { stages } => assert_eq!(stages.len(), 3),
            other => break other,
        }
    };
    assert_eq!(terminal, PlaybackEvent::Finished);
    studio.dispose();

    let (back, back_spec) = read_wav(&dst).unwrap();
    assert_eq!(back_spec, spec);
    assert_eq!(back.len(), samples.len());
    let gain = 10f32.powf(-6.0 / 20.0);
    for (out, inp) in back.iter().zip(&samples) {
        assert!((out - inp * gain).abs() < 1e-6);
    }
}
