//! Studio session
//!
//! Ties the voice catalog, speech client, history and playback together: one
//! selected voice, one generation at a time, one clip playing at a time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::{AudioClip, HistoryStore, Selection};
use crate::playback::{OutputSink, PlaybackBridge, PlaybackElement};
use crate::speech::SpeechSynthesizer;
use crate::visualizer::Surface;
use crate::voice::{DEFAULT_VOICE, Gender, VoiceCatalog, VoiceOption};
use crate::{Error, Result};

/// What the studio is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Generating,
    Playing,
    /// Reserved; a failed generation reports `Idle` and keeps the message in
    /// [`Studio::last_error`]
    Error,
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Generating => f.write_str("generating"),
            Self::Playing => f.write_str("playing"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Session options
#[derive(Clone, Debug)]
pub struct StudioOptions {
    /// Start playing a clip as soon as it is generated
    pub autoplay: bool,
    /// Voice selected at startup
    pub default_voice: String,
    /// Visualizer frame period
    pub frame_interval: Duration,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            default_voice: DEFAULT_VOICE.to_string(),
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// Interactive speech session
pub struct Studio<S: Surface + Send + 'static> {
    synthesizer: Box<dyn SpeechSynthesizer>,
    catalog: VoiceCatalog,
    history: HistoryStore,
    player: PlaybackElement,
    bridge: PlaybackBridge<S>,
    selected_voice: String,
    generating: bool,
    last_error: Option<String>,
    autoplay: bool,
}

impl<S: Surface + Send + 'static> Studio<S> {
    /// Create a session drawing to `surface` and playing through `sink`
    ///
    /// An unknown default voice falls back to the first built-in voice.
    pub fn new(
        synthesizer: Box<dyn SpeechSynthesizer>,
        surface: S,
        sink: Box<dyn OutputSink>,
        options: StudioOptions,
    ) -> Self {
        let catalog = VoiceCatalog::new();
        let selected_voice = match catalog.find(&options.default_voice) {
            Some(voice) => voice.id.clone(),
            None => {
                tracing::warn!(
                    voice = %options.default_voice,
                    "unknown default voice, using {DEFAULT_VOICE}"
                );
                DEFAULT_VOICE.to_string()
            }
        };

        let player = PlaybackElement::new();
        let bridge = PlaybackBridge::new(player.clone(), surface, sink, options.frame_interval);

        Self {
            synthesizer,
            catalog,
            history: HistoryStore::new(),
            player,
            bridge,
            selected_voice,
            generating: false,
            last_error: None,
            autoplay: options.autoplay,
        }
    }

    /// Select a voice by id or name
    ///
    /// # Errors
    ///
    /// Returns error if no voice matches
    pub fn select_voice(&mut self, id_or_name: &str) -> Result<&VoiceOption> {
        let voice = self
            .catalog
            .find(id_or_name)
            .ok_or_else(|| Error::NotFound(format!("voice {id_or_name}")))?;

        tracing::debug!(voice = %voice.id, "voice selected");
        self.selected_voice.clone_from(&voice.id);
        Ok(voice)
    }

    /// Register a custom voice from a reference recording and select it
    ///
    /// The sample must exist but is not uploaded; the voice renders with the
    /// built-in voice for its gender.
    ///
    /// # Errors
    ///
    /// Returns error if the sample is not a file or the name is empty
    pub fn create_custom_voice(
        &mut self,
        name: &str,
        gender: Gender,
        sample: &Path,
    ) -> Result<&VoiceOption> {
        if !sample.is_file() {
            return Err(Error::NotFound(format!("voice sample {}", sample.display())));
        }

        let id = self.catalog.add_custom(name, gender)?.id.clone();
        tracing::info!(
            name = name.trim(),
            %gender,
            sample = %sample.display(),
            "custom voice created"
        );
        self.select_voice(&id)
    }

    /// Remove a custom voice
    ///
    /// Clips made with it keep their voice id and show as unknown. If it was
    /// selected, the default voice is selected instead.
    ///
    /// # Errors
    ///
    /// Returns error if the id is unknown or built-in
    pub fn remove_custom_voice(&mut self, id: &str) -> Result<VoiceOption> {
        let removed = self.catalog.remove_custom(id)?;
        if self.selected_voice == removed.id {
            self.selected_voice = DEFAULT_VOICE.to_string();
        }
        Ok(removed)
    }

    /// Render `text` with the selected voice and add it to history
    ///
    /// On success the clip becomes current and, with autoplay, starts playing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyText`] for blank input without touching status.
    /// Any other failure is logged, kept as [`Studio::last_error`], and
    /// returned; history is left as it was.
    pub async fn generate(&mut self, text: &str) -> Result<&AudioClip> {
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }

        let voice_id = self.selected_voice.clone();
        let upstream = self.catalog.upstream_name(&voice_id).to_string();

        self.generating = true;
        self.last_error = None;
        tracing::info!(
            voice = %voice_id,
            upstream = %upstream,
            chars = text.len(),
            "generating speech"
        );

        let outcome = self.synthesizer.generate(text, &upstream).await;
        self.generating = false;

        let speech = match outcome {
            Ok(speech) => speech,
            Err(e) => {
                tracing::error!(error = %e, voice = %voice_id, "speech generation failed");
                self.last_error = Some(e.user_message());
                return Err(e);
            }
        };

        let clip = AudioClip::new(text, voice_id, speech.resource);
        tracing::info!(
            id = %clip.id,
            duration_ms = clip.duration().as_millis(),
            "speech generated"
        );

        let resource = clip.resource.clone();
        let clip = self.history.append(clip);

        self.player.load(&resource);
        if self.autoplay {
            if let Err(e) = self.player.play() {
                tracing::warn!(error = %e, "failed to start playback");
            }
        }
        self.bridge.set_playing(self.player.is_playing());

        Ok(clip)
    }

    /// Toggle a clip: pause it if it is the one playing, otherwise play it
    /// from the beginning
    ///
    /// # Errors
    ///
    /// Returns error if the clip is unknown
    pub fn play_clip(&mut self, id: &str) -> Result<()> {
        match self.history.select_for_playback(id, self.player.is_playing())? {
            Selection::Pause => self.player.pause(),
            Selection::Play(resource) => {
                self.player.load(&resource);
                self.player.play()?;
            }
        }

        self.sync_playback();
        Ok(())
    }

    /// Remove a clip; deleting the current clip stops playback
    ///
    /// # Errors
    ///
    /// Returns error if the clip is unknown
    pub fn delete_clip(&mut self, id: &str) -> Result<AudioClip> {
        let removal = self
            .history
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("clip {id}")))?;

        if removal.was_current {
            self.player.pause();
            self.player.unload();
            self.sync_playback();
        }

        Ok(removal.clip)
    }

    /// Pause whatever is playing
    pub fn pause(&mut self) {
        self.player.pause();
        self.sync_playback();
    }

    /// Forward the element's playing flag to the visualizer
    ///
    /// Call after every playback event, including the end of a clip.
    pub fn sync_playback(&mut self) {
        self.bridge.set_playing(self.player.is_playing());
    }

    /// Write a clip to `dir` as `my-voice{id}.wav`
    ///
    /// # Errors
    ///
    /// Returns error if the clip is unknown or the file cannot be written
    pub fn save_clip(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let clip = self
            .history
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("clip {id}")))?;

        let path = clip.resource.save_to(dir, &clip.id)?;
        tracing::info!(path = %path.display(), "clip saved");
        Ok(path)
    }

    /// Display label for a voice id; removed voices show as unknown
    #[must_use]
    pub fn voice_label(&self, voice_id: &str) -> &str {
        self.catalog.label(voice_id)
    }

    /// Derived from the in-flight flag and the element; failures read as idle
    #[must_use]
    pub fn status(&self) -> GenerationStatus {
        if self.generating {
            GenerationStatus::Generating
        } else if self.player.is_playing() {
            GenerationStatus::Playing
        } else {
            GenerationStatus::Idle
        }
    }

    /// User-facing message of the last failed generation
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn selected_voice(&self) -> Option<&VoiceOption> {
        self.catalog.get(&self.selected_voice)
    }

    #[must_use]
    pub const fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The playback element; subscribe to it for end-of-clip events
    #[must_use]
    pub const fn player(&self) -> &PlaybackElement {
        &self.player
    }

    #[must_use]
    pub const fn bridge(&self) -> &PlaybackBridge<S> {
        &self.bridge
    }
}
