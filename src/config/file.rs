//! TOML configuration file loading
//!
//! Supports `~/.config/speech-studio/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StudioConfigFile {
    /// Speech API configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Audio output configuration
    #[serde(default)]
    pub audio: AudioFileConfig,

    /// Spectrum visualizer configuration
    #[serde(default)]
    pub visualizer: VisualizerFileConfig,

    /// Where saved clips go
    #[serde(default)]
    pub output: OutputFileConfig,
}

/// Speech API configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeechFileConfig {
    /// Gemini API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gemini-2.5-flash-preview-tts")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Voice selected at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_voice: Option<String>,
}

/// Audio output configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AudioFileConfig {
    /// Enable the output device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Start playback as soon as a clip is generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
}

/// Spectrum visualizer configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VisualizerFileConfig {
    /// Show the spectrum while playing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Terminal columns used by the meter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,

    /// Frames per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
}

/// Saved clip location
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputFileConfig {
    /// Directory for saved WAV files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `StudioConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> StudioConfigFile {
    let Some(path) = config_file_path() else {
        return StudioConfigFile::default();
    };

    load_config_file_from(&path)
}

/// Load a TOML config file from an explicit path
///
/// Returns `StudioConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> StudioConfigFile {
    if !path.exists() {
        return StudioConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                StudioConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            StudioConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/speech-studio/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("speech-studio").join("config.toml"))
}
