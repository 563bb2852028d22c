//! Playback element: one loaded clip, a play head, and play/pause state

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::audio::AudioResource;
use crate::{Error, Result};

/// Playback state transitions published by the element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// No source loaded
    Idle,
    Playing,
    Paused,
    /// Reached the end of the source
    Ended,
}

#[derive(Debug)]
struct ElementState {
    samples: Arc<[f32]>,
    sample_rate: u32,
    position: usize,
    playing: bool,
    source: Option<String>,
}

/// Decoded audio source driven by the output device
///
/// Clones share the same state; the output sink pulls samples through
/// [`PlaybackElement::render`] from the audio thread.
#[derive(Clone, Debug)]
pub struct PlaybackElement {
    state: Arc<Mutex<ElementState>>,
    events: Arc<watch::Sender<PlaybackEvent>>,
    attached: Arc<AtomicBool>,
}

impl Default for PlaybackElement {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackElement {
    /// Create an element with no source
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = watch::channel(PlaybackEvent::Idle);
        Self {
            state: Arc::new(Mutex::new(ElementState {
                samples: Arc::from(Vec::new()),
                sample_rate: crate::audio::SAMPLE_RATE,
                position: 0,
                playing: false,
                source: None,
            })),
            events: Arc::new(events),
            attached: Arc::new(AtomicBool::new(false)),
        }
    }

    fn state(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: PlaybackEvent) {
        self.events.send_if_modified(|current| {
            if *current == event {
                false
            } else {
                *current = event;
                true
            }
        });
    }

    /// Load a speech resource, paused at position zero
    ///
    /// The payload is 24kHz mono PCM16; a trailing odd byte is dropped.
    pub fn load(&self, resource: &AudioResource) {
        let samples = crate::audio::pcm16_to_f32(resource.pcm());
        self.load_samples(samples, crate::audio::SAMPLE_RATE, resource.id());
    }

    /// Load already-decoded mono samples
    pub fn load_samples(&self, samples: Vec<f32>, sample_rate: u32, source_id: &str) {
        {
            let mut state = self.state();
            state.samples = samples.into();
            state.sample_rate = sample_rate;
            state.position = 0;
            state.playing = false;
            state.source = Some(source_id.to_string());
        }

        tracing::debug!(source = source_id, sample_rate, "playback source loaded");
        self.publish(PlaybackEvent::Paused);
    }

    /// Start or resume playback; an ended source restarts from zero
    ///
    /// # Errors
    ///
    /// Returns error if no source is loaded
    pub fn play(&self) -> Result<()> {
        {
            let mut state = self.state();
            if state.source.is_none() {
                return Err(Error::Audio("no source loaded".to_string()));
            }
            if state.position >= state.samples.len() {
                state.position = 0;
            }
            state.playing = true;
        }

        self.publish(PlaybackEvent::Playing);
        Ok(())
    }

    /// Pause playback, keeping the play head
    pub fn pause(&self) {
        let was_playing = std::mem::replace(&mut self.state().playing, false);
        if was_playing {
            self.publish(PlaybackEvent::Paused);
        }
    }

    /// Drop the current source
    pub fn unload(&self) {
        {
            let mut state = self.state();
            state.samples = Arc::from(Vec::new());
            state.position = 0;
            state.playing = false;
            state.source = None;
        }
        self.publish(PlaybackEvent::Idle);
    }

    /// Whether the element is currently playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    /// Current play head in samples
    #[must_use]
    pub fn position(&self) -> usize {
        self.state().position
    }

    /// Number of samples in the loaded source
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().samples.len()
    }

    /// Whether the loaded source is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate of the loaded source
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.state().sample_rate
    }

    /// Resource id of the loaded source
    #[must_use]
    pub fn source_id(&self) -> Option<String> {
        self.state().source.clone()
    }

    /// Latest published event
    #[must_use]
    pub fn event(&self) -> PlaybackEvent {
        *self.events.borrow()
    }

    /// Subscribe to playback transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Whether a playback graph has claimed this element
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Claim the element for a graph; returns false if already claimed
    pub(crate) fn mark_attached(&self) -> bool {
        self.attached
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Fill an interleaved output buffer, advancing the play head
    ///
    /// Writes silence while paused. Publishes `Ended` when the source runs out.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut ended = false;

        {
            let mut state = self.state();
            for frame in out.chunks_mut(channels) {
                let sample = if state.playing && state.position < state.samples.len() {
                    let s = state.samples[state.position];
                    state.position += 1;
                    s
                } else {
                    0.0
                };

                for slot in frame.iter_mut() {
                    *slot = sample;
                }
            }

            if state.playing && state.position >= state.samples.len() {
                state.playing = false;
                ended = true;
            }
        }

        if ended {
            tracing::debug!("playback ended");
            self.publish(PlaybackEvent::Ended);
        }
    }
}

/// Decode WAV bytes into mono f32 samples
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::Audio(format!(
            "unsupported wav format: {} bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let interleaved: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.map(|v| f32::from(v) / 32768.0))
        .collect::<std::result::Result<_, _>>()?;

    let channels = usize::from(spec.channels.max(1));
    #[allow(clippy::cast_precision_loss)]
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

/// Read a WAV file from disk into a resource-independent sample buffer
///
/// # Errors
///
/// Returns error if the file cannot be read or is not 16-bit PCM
pub fn read_wav_file(path: &std::path::Path) -> Result<(Vec<f32>, u32)> {
    let bytes = std::fs::read(path)?;
    decode_wav(&bytes)
}
