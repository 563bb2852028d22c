//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use serde_json::{Value, json};

use speech_studio::config::SpeechConfig;
use speech_studio::speech::GeneratedSpeech;
use speech_studio::{AudioResource, Error, MissingAudio, Result, SpeechSynthesizer};

/// One request seen by the mock server
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the Gemini `generateContent` endpoint
pub struct MockGemini {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockGemini {
    /// Serve `body` with `status` for every request
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body,
            requests: Arc::clone(&requests),
        };

        let app = axum::Router::new()
            .route("/v1beta/models/{*rest}", post(generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Serve a successful response carrying `pcm`
    pub async fn with_audio(pcm: &[u8]) -> Self {
        Self::start(StatusCode::OK, audio_response(pcm)).await
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Speech config pointing at this server
    pub fn speech_config(&self) -> SpeechConfig {
        SpeechConfig {
            api_key: Some(SecretString::from("test-key")),
            base_url: self.base_url.clone(),
            ..SpeechConfig::default()
        }
    }
}

async fn generate(
    State(state): State<MockState>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: rest,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (state.status, Json(state.body.clone()))
}

/// A `generateContent` response carrying base64 PCM
pub fn audio_response(pcm: &[u8]) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "inlineData": {
                        "mimeType": "audio/L16;codec=pcm;rate=24000",
                        "data": STANDARD.encode(pcm)
                    }
                }]
            }
        }]
    })
}

/// Little-endian 16-bit PCM of a sine tone at 24 kHz
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn sine_pcm(frequency: f32, samples: usize) -> Vec<u8> {
    (0..samples)
        .flat_map(|i| {
            let t = i as f32 / 24_000.0;
            let value = (2.0 * std::f32::consts::PI * frequency * t).sin() * 8000.0;
            (value as i16).to_le_bytes()
        })
        .collect()
}

/// Synthesizer that records calls and returns a fixed tone, or fails on demand
#[derive(Default)]
pub struct FakeSynthesizer {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: Arc<Mutex<bool>>,
    /// PCM returned instead of the default tone when set
    pub pcm: Arc<Mutex<Option<Vec<u8>>>>,
}

impl FakeSynthesizer {
    /// Fake plus shared handles to its call log and failure switch
    pub fn new() -> (Self, Arc<Mutex<Vec<(String, String)>>>, Arc<Mutex<bool>>) {
        let fake = Self::default();
        let calls = Arc::clone(&fake.calls);
        let fail = Arc::clone(&fake.fail);
        (fake, calls, fail)
    }

    /// Handle for swapping the PCM payload after the fake is boxed
    pub fn pcm_handle(&self) -> Arc<Mutex<Option<Vec<u8>>>> {
        Arc::clone(&self.pcm)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn generate(&self, text: &str, voice_name: &str) -> Result<GeneratedSpeech> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_name.to_string()));

        if *self.fail.lock().unwrap() {
            return Err(Error::NoAudio(MissingAudio::NoInlineData));
        }

        let pcm = self
            .pcm
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| sine_pcm(440.0, 2400));
        Ok(GeneratedSpeech {
            resource: AudioResource::from_pcm(&pcm),
            pcm,
        })
    }
}
