//! Configuration management for speech studio

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::voice::DEFAULT_VOICE;

/// Default Gemini text-to-speech model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Speech studio configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Speech API configuration
    pub speech: SpeechConfig,

    /// Audio output configuration
    pub audio: AudioConfig,

    /// Spectrum visualizer configuration
    pub visualizer: VisualizerConfig,

    /// Directory for saved clips
    pub output_dir: PathBuf,
}

/// Speech API configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Gemini API key (from `GEMINI_API_KEY` or `API_KEY` env)
    pub api_key: Option<SecretString>,

    /// Model identifier
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Voice selected at startup
    pub default_voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_voice: DEFAULT_VOICE.to_string(),
        }
    }
}

/// Audio output configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Use the system output device
    pub enabled: bool,

    /// Play clips right after generation
    pub autoplay: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autoplay: true,
        }
    }
}

/// Spectrum visualizer configuration
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Show the spectrum while playing
    pub enabled: bool,

    /// Terminal columns used by the meter
    pub columns: usize,

    /// Frames per second of the draw loop
    pub fps: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            columns: 60,
            fps: 60,
        }
    }
}

impl VisualizerConfig {
    /// Interval between animation frames
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

/// Default download directory: `~/.local/share/speech-studio/clips`
fn default_output_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("clips"),
        |d| d.data_dir().join("speech-studio").join("clips"),
    )
}

impl Config {
    /// Load configuration from the environment and the config file
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit audio disable option
    #[must_use]
    pub fn load_with_options(disable_audio: bool) -> Self {
        let mut config = Self::load();
        if disable_audio {
            tracing::info!("audio output explicitly disabled via --no-audio");
            config.audio.enabled = false;
        }
        config
    }

    /// Resolve configuration with precedence env > file > default
    pub fn from_sources(
        fc: file::StudioConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_flag = |key: &str| {
            env(key).map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        };

        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(fc.speech.api_key)
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let defaults = SpeechConfig::default();
        let speech = SpeechConfig {
            api_key,
            model: env("SPEECH_STUDIO_MODEL")
                .or(fc.speech.model)
                .unwrap_or(defaults.model),
            base_url: env("SPEECH_STUDIO_BASE_URL")
                .or(fc.speech.base_url)
                .unwrap_or(defaults.base_url),
            default_voice: env("SPEECH_STUDIO_VOICE")
                .or(fc.speech.default_voice)
                .unwrap_or(defaults.default_voice),
        };

        let audio = AudioConfig {
            enabled: !env_flag("SPEECH_STUDIO_DISABLE_AUDIO").unwrap_or(false)
                && fc.audio.enabled.unwrap_or(true),
            autoplay: fc.audio.autoplay.unwrap_or(true),
        };

        let vis_defaults = VisualizerConfig::default();
        let visualizer = VisualizerConfig {
            enabled: fc.visualizer.enabled.unwrap_or(vis_defaults.enabled),
            columns: fc.visualizer.columns.unwrap_or(vis_defaults.columns).max(1),
            fps: fc.visualizer.fps.unwrap_or(vis_defaults.fps).max(1),
        };

        let output_dir = env("SPEECH_STUDIO_OUTPUT_DIR")
            .or(fc.output.dir)
            .map_or_else(default_output_dir, PathBuf::from);

        Self {
            speech,
            audio,
            visualizer,
            output_dir,
        }
    }
}
