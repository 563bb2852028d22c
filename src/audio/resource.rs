//! Playable audio resource handles

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::codec::{self, CHANNELS, SAMPLE_RATE, WAV_HEADER_LEN};
use crate::Result;

/// Opaque handle to an in-memory WAV file
///
/// Cheap to clone. Usable as a playback source and for saving to disk.
#[derive(Clone, Debug)]
pub struct AudioResource {
    id: String,
    wav: Arc<[u8]>,
}

impl AudioResource {
    /// Wrap raw 24kHz mono PCM into a new WAV resource
    #[must_use]
    pub fn from_pcm(pcm: &[u8]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            wav: codec::wrap_speech_pcm(pcm).into(),
        }
    }

    /// Unique resource identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full WAV bytes (header and samples)
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.wav
    }

    /// PCM payload after the canonical header
    #[must_use]
    pub fn pcm(&self) -> &[u8] {
        self.wav.get(WAV_HEADER_LEN..).unwrap_or_default()
    }

    /// Playback duration assuming the fixed speech format
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> std::time::Duration {
        let bytes_per_sec = f64::from(SAMPLE_RATE) * f64::from(CHANNELS) * 2.0;
        std::time::Duration::from_secs_f64(self.pcm().len() as f64 / bytes_per_sec)
    }

    /// Suggested download file name for a clip
    #[must_use]
    pub fn suggested_filename(clip_id: &str) -> String {
        format!("my-voice{clip_id}.wav")
    }

    /// Write the WAV file into `dir` under the suggested name
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the file written
    pub fn save_to(&self, dir: &Path, clip_id: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::suggested_filename(clip_id));
        std::fs::write(&path, &self.wav)?;

        tracing::debug!(path = %path.display(), bytes = self.wav.len(), "saved clip");
        Ok(path)
    }
}
