//! Interactive first-run setup wizard (`speech-studio setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{
    AudioFileConfig, SpeechFileConfig, StudioConfigFile, config_file_path, load_config_file,
};
use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::voice::{DEFAULT_VOICE, builtin_voices};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Speech Studio Setup\n");

    let existing = load_config_file();
    let config_path = config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/speech-studio/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. API key
    let existing_key = existing.speech.api_key.as_deref();
    let prompt = match existing_key.map(mask_key) {
        Some(masked) => format!("Gemini API key (current: {masked}, leave blank to keep)"),
        None => "Gemini API key (GEMINI_API_KEY)".to_string(),
    };

    let api_key_input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    let api_key = if api_key_input.trim().is_empty() {
        existing_key.map(str::to_string)
    } else {
        Some(api_key_input.trim().to_string())
    };

    // 2. Model
    let model: String = Input::new()
        .with_prompt("Speech model")
        .default(
            existing
                .speech
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        )
        .interact_text()?;

    // 3. Default voice
    let voices = builtin_voices();
    let labels: Vec<String> = voices
        .iter()
        .map(|v| format!("{} ({}, {})", v.name, v.gender, v.description))
        .collect();
    let current_voice = existing.speech.default_voice.as_deref().unwrap_or(DEFAULT_VOICE);
    let default_idx = voices
        .iter()
        .position(|v| v.name.eq_ignore_ascii_case(current_voice))
        .unwrap_or(0);

    let voice_idx = Select::new()
        .with_prompt("Default voice")
        .items(&labels)
        .default(default_idx)
        .interact()?;

    // 4. Audio output
    let enable_audio = Confirm::new()
        .with_prompt("Enable audio output?")
        .default(existing.audio.enabled.unwrap_or(true))
        .interact()?;

    let autoplay = if enable_audio {
        Confirm::new()
            .with_prompt("Play clips as soon as they are generated?")
            .default(existing.audio.autoplay.unwrap_or(true))
            .interact()?
    } else {
        false
    };

    // 5. Build and write config
    let base_url = existing
        .speech
        .base_url
        .filter(|url| url != DEFAULT_BASE_URL);

    let config_file = StudioConfigFile {
        speech: SpeechFileConfig {
            api_key,
            model: Some(model),
            base_url,
            default_voice: Some(voices[voice_idx].id.clone()),
        },
        audio: AudioFileConfig {
            enabled: Some(enable_audio),
            autoplay: Some(autoplay),
        },
        visualizer: existing.visualizer,
        output: existing.output,
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `speech-studio` to start a session.");

    Ok(())
}

/// Show only the ends of a key
fn mask_key(key: &str) -> String {
    if key.len() > 8 && key.is_ascii() {
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    } else {
        "****".to_string()
    }
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &StudioConfigFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}
