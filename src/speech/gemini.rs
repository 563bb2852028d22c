//! Gemini text-to-speech client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::types::{GenerateRequest, GenerateResponse};
use super::{GeneratedSpeech, SpeechSynthesizer};
use crate::audio::{self, AudioResource};
use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Synthesizes speech through the Gemini `generateContent` endpoint
pub struct GeminiSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSpeech")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiSpeech {
    /// Create a client from speech configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| Error::Config("API Key is missing".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one render request and return the base64 audio payload
    async fn request_audio(&self, text: &str, voice_name: &str) -> Result<String> {
        let request = GenerateRequest::speech(text, voice_name);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("Gemini TTS error {status}: {body}")));
        }

        let body: GenerateResponse = response.json().await?;
        body.extract_audio().into_result().map_err(|reason| {
            tracing::warn!(%reason, model = %self.model, "response carried no audio");
            Error::NoAudio(reason)
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeech {
    async fn generate(&self, text: &str, voice_name: &str) -> Result<GeneratedSpeech> {
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }

        tracing::debug!(
            model = %self.model,
            voice = voice_name,
            chars = text.len(),
            "requesting speech"
        );

        let payload = self.request_audio(text, voice_name).await.inspect_err(|e| {
            tracing::error!(error = %e, "Gemini TTS request failed");
        })?;

        let pcm = audio::decode_base64(&payload)?;
        let resource = AudioResource::from_pcm(&pcm);

        tracing::debug!(
            bytes = pcm.len(),
            duration_ms = resource.duration().as_millis(),
            "speech received"
        );

        Ok(GeneratedSpeech { resource, pcm })
    }
}
