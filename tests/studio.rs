//! Studio session integration tests
//!
//! Uses a headless sink and a recording surface; no audio hardware needed.

use std::time::Duration;

use speech_studio::error::GENERATION_FAILED_MESSAGE;
use speech_studio::playback::{BridgeState, ManualSink};
use speech_studio::visualizer::RecordingSurface;
use speech_studio::voice::UNKNOWN_VOICE_LABEL;
use speech_studio::{
    Error, GeminiSpeech, Gender, GenerationStatus, PlaybackEvent, SpeechSynthesizer, Studio,
    StudioOptions,
};

mod common;

use common::{FakeSynthesizer, MockGemini, sine_pcm};

fn studio_with(
    synthesizer: impl SpeechSynthesizer + 'static,
) -> (Studio<RecordingSurface>, ManualSink) {
    let sink = ManualSink::new(1);
    let studio = Studio::new(
        Box::new(synthesizer),
        RecordingSurface::default(),
        Box::new(sink.clone()),
        StudioOptions {
            frame_interval: Duration::from_millis(5),
            ..StudioOptions::default()
        },
    );
    (studio, sink)
}

#[tokio::test]
async fn test_hello_world_end_to_end() {
    let pcm = sine_pcm(440.0, 4800);
    let server = MockGemini::with_audio(&pcm).await;
    let client = GeminiSpeech::new(&server.speech_config()).unwrap();
    let (mut studio, sink) = studio_with(client);

    let clip = studio.generate("Hello world").await.unwrap();
    assert_eq!(clip.text, "Hello world");
    assert_eq!(clip.voice_id, "Kore");
    assert_eq!(clip.resource.pcm(), pcm.as_slice());
    let clip_id = clip.id.clone();

    assert_eq!(studio.history().len(), 1);
    assert_eq!(studio.history().current_id(), Some(clip_id.as_str()));
    assert_eq!(studio.status(), GenerationStatus::Playing);
    assert_eq!(studio.bridge().state(), BridgeState::Attached);

    let body = &server.requests()[0].body;
    assert_eq!(
        body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Kore"
    );

    // Drain the clip through the sink
    let mut events = studio.player().subscribe();
    let rendered = sink.pump(4800);
    assert!(rendered.iter().any(|s| s.abs() > 0.0));
    events.changed().await.unwrap();
    assert_eq!(*events.borrow(), PlaybackEvent::Ended);

    studio.sync_playback();
    assert_eq!(studio.status(), GenerationStatus::Idle);
    assert!(!studio.bridge().is_animating());
}

#[tokio::test]
async fn test_custom_voice_sends_gender_fallback() {
    let (fake, calls, _fail) = FakeSynthesizer::new();
    let (mut studio, _sink) = studio_with(fake);
    let sample = tempfile::NamedTempFile::new().unwrap();

    let voice_id = studio
        .create_custom_voice("Grandpa", Gender::Male, sample.path())
        .unwrap()
        .id
        .clone();
    assert!(voice_id.starts_with("custom-"));

    let clip = studio.generate("Once upon a time").await.unwrap();
    assert_eq!(clip.voice_id, voice_id);

    assert_eq!(
        calls.lock().unwrap().as_slice(),
        [("Once upon a time".to_string(), "Puck".to_string())]
    );
    assert_eq!(studio.voice_label(&voice_id), "Grandpa");
}

#[tokio::test]
async fn test_failure_leaves_history_unmodified() {
    let (fake, _calls, fail) = FakeSynthesizer::new();
    let (mut studio, _sink) = studio_with(fake);

    studio.generate("first").await.unwrap();
    *fail.lock().unwrap() = true;

    let err = studio.generate("second").await.unwrap_err();
    assert!(matches!(err, Error::NoAudio(_)));
    assert_eq!(studio.history().len(), 1);
    assert_eq!(studio.last_error(), Some(GENERATION_FAILED_MESSAGE));

    studio.pause();
    assert_eq!(studio.status(), GenerationStatus::Idle);

    // Still re-triggerable
    *fail.lock().unwrap() = false;
    studio.generate("third").await.unwrap();
    assert_eq!(studio.history().len(), 2);
    assert!(studio.last_error().is_none());
}

#[tokio::test]
async fn test_missing_key_reports_config_error() {
    let server = MockGemini::with_audio(&[0, 0]).await;
    let mut config = server.speech_config();
    config.api_key = None;

    let err = GeminiSpeech::new(&config).unwrap_err();
    assert_eq!(err.user_message(), "API Key is missing");
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_play_toggle_and_switch() {
    let (fake, _calls, _fail) = FakeSynthesizer::new();
    let (mut studio, sink) = studio_with(fake);

    let first = studio.generate("one").await.unwrap().id.clone();
    let second = studio.generate("two").await.unwrap().id.clone();
    assert!(studio.player().is_playing());

    // Pausing the current clip
    studio.play_clip(&second).unwrap();
    assert!(!studio.player().is_playing());
    assert_eq!(studio.status(), GenerationStatus::Idle);

    // Switching restarts from the top of the other clip
    sink.pump(100);
    studio.play_clip(&first).unwrap();
    assert!(studio.player().is_playing());
    assert_eq!(studio.player().position(), 0);
    assert_eq!(studio.history().current_id(), Some(first.as_str()));

    assert!(matches!(studio.play_clip("nope"), Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_delete_current_clip_stops_playback() {
    let (fake, _calls, _fail) = FakeSynthesizer::new();
    let (mut studio, _sink) = studio_with(fake);

    let first = studio.generate("one").await.unwrap().id.clone();
    let second = studio.generate("two").await.unwrap().id.clone();

    let deleted = studio.delete_clip(&first).unwrap();
    assert_eq!(deleted.text, "one");
    assert!(studio.player().is_playing());

    studio.delete_clip(&second).unwrap();
    assert!(studio.history().is_empty());
    assert!(studio.history().current().is_none());
    assert!(!studio.player().is_playing());
    assert!(studio.player().source_id().is_none());

    let surface = studio.bridge().surface();
    assert!(surface.lock().unwrap().shows_baseline());
}

#[tokio::test]
async fn test_removed_voice_shows_unknown_label() {
    let (fake, _calls, _fail) = FakeSynthesizer::new();
    let (mut studio, _sink) = studio_with(fake);
    let sample = tempfile::NamedTempFile::new().unwrap();

    let voice_id = studio
        .create_custom_voice("Narrator", Gender::Female, sample.path())
        .unwrap()
        .id
        .clone();
    let clip_voice = studio.generate("hi").await.unwrap().voice_id.clone();
    studio.remove_custom_voice(&voice_id).unwrap();

    assert_eq!(studio.voice_label(&clip_voice), UNKNOWN_VOICE_LABEL);
    assert_eq!(studio.history().len(), 1);
}

#[tokio::test]
async fn test_save_clip_writes_wav() {
    let (fake, _calls, _fail) = FakeSynthesizer::new();
    let (mut studio, _sink) = studio_with(fake);
    let dir = tempfile::tempdir().unwrap();

    let id = studio.generate("save me").await.unwrap().id.clone();
    let path = studio.save_clip(&id, dir.path()).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!("my-voice{id}.wav")
    );
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
}

#[tokio::test]
async fn test_odd_length_clip_plays() {
    let mut pcm = sine_pcm(440.0, 2400);
    pcm.push(0x01);
    assert_eq!(pcm.len(), 4801);

    let server = MockGemini::with_audio(&pcm).await;
    let client = GeminiSpeech::new(&server.speech_config()).unwrap();
    let (mut studio, sink) = studio_with(client);

    let clip = studio.generate("odd").await.unwrap();
    assert_eq!(clip.resource.pcm(), pcm.as_slice());
    let resource_id = clip.resource.id().to_string();

    assert!(studio.player().is_playing());
    assert_eq!(studio.player().source_id().as_deref(), Some(resource_id.as_str()));
    assert_eq!(studio.player().len(), 2400);
    assert_eq!(studio.status(), GenerationStatus::Playing);

    let rendered = sink.pump(2400);
    assert!(rendered.iter().any(|s| s.abs() > 0.0));
    assert!(!studio.player().is_playing());
}

#[tokio::test]
async fn test_odd_length_clip_replaces_previous_playback() {
    let (fake, _calls, _fail) = FakeSynthesizer::new();
    let payload = fake.pcm_handle();
    let (mut studio, _sink) = studio_with(fake);

    let first = studio.generate("even").await.unwrap().id.clone();

    let mut odd = sine_pcm(220.0, 1200);
    odd.push(0xff);
    *payload.lock().unwrap() = Some(odd);
    let clip = studio.generate("odd").await.unwrap();
    let (second, resource_id) = (clip.id.clone(), clip.resource.id().to_string());

    assert_eq!(studio.history().current_id(), Some(second.as_str()));
    assert_eq!(studio.player().source_id().as_deref(), Some(resource_id.as_str()));
    assert!(studio.player().is_playing());

    // Toggling the current clip pauses it, not the earlier one
    studio.play_clip(&second).unwrap();
    assert!(!studio.player().is_playing());
    assert_eq!(studio.player().source_id().as_deref(), Some(resource_id.as_str()));

    studio.play_clip(&first).unwrap();
    assert!(studio.player().is_playing());
    assert_eq!(studio.player().len(), 2400);
}
