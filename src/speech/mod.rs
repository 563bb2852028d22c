//! Speech request client
//!
//! Sends text plus a prebuilt voice name to the speech API and turns the
//! inline PCM payload into a playable WAV resource.

mod gemini;
pub mod types;

use async_trait::async_trait;

pub use gemini::GeminiSpeech;
pub use types::AudioExtraction;

use crate::Result;
use crate::audio::AudioResource;

/// Result of a successful speech render
#[derive(Clone, Debug)]
pub struct GeneratedSpeech {
    /// Playable WAV resource
    pub resource: AudioResource,
    /// Raw decoded PCM bytes
    pub pcm: Vec<u8>,
}

/// Text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` with the prebuilt voice `voice_name`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no audio
    async fn generate(&self, text: &str, voice_name: &str) -> Result<GeneratedSpeech>;
}
