//! Speech Studio - Text-to-speech studio with live spectrum playback
//!
//! This library provides the core functionality for the studio:
//! - Speech generation through the Gemini text-to-speech API
//! - Raw PCM to WAV packaging
//! - Voice catalog with cosmetic custom voices
//! - Session history of generated clips
//! - Playback with a frequency-bar visualizer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Studio                          │
//! │   Voices  │  History  │  Status  │  Downloads       │
//! └──────────┬─────────────────────────┬────────────────┘
//!            │                         │
//! ┌──────────▼──────────┐   ┌──────────▼────────────────┐
//! │   Speech client     │   │   Playback bridge          │
//! │ Gemini → PCM → WAV  │   │ Element → Analyser → Sink  │
//! └─────────────────────┘   │        ↓                   │
//!                           │    Visualizer surface      │
//!                           └────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod playback;
pub mod setup;
pub mod speech;
pub mod studio;
pub mod visualizer;
pub mod voice;

pub use audio::AudioResource;
pub use config::Config;
pub use error::{Error, MissingAudio, Result};
pub use history::{AudioClip, HistoryStore, Selection};
pub use playback::{PlaybackBridge, PlaybackElement, PlaybackEvent};
pub use speech::{GeminiSpeech, GeneratedSpeech, SpeechSynthesizer};
pub use studio::{GenerationStatus, Studio, StudioOptions};
pub use voice::{Gender, VoiceCatalog, VoiceOption};
