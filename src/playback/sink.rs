//! Audio output sinks

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Pull callback filling an interleaved f32 buffer with `channels` channels
pub type RenderFn = Box<dyn FnMut(&mut [f32], usize) + Send + 'static>;

/// Destination of the playback graph
pub trait OutputSink {
    /// Install the render callback; output stays suspended until [`OutputSink::resume`]
    ///
    /// # Errors
    ///
    /// Returns error if the output stream cannot be built
    fn start(&mut self, render: RenderFn) -> Result<()>;

    /// Start pulling audio
    ///
    /// # Errors
    ///
    /// Returns error if the device refuses to start
    fn resume(&mut self) -> Result<()>;

    /// Whether the sink is pulling audio
    fn is_running(&self) -> bool;
}

/// Plays audio on the default output device
pub struct CpalSink {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    running: bool,
}

impl CpalSink {
    /// Open the default output device at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn new(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
            .or_else(|| {
                // Fallback: try stereo
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2
                        && c.min_sample_rate() <= SampleRate(sample_rate)
                        && c.max_sample_rate() >= SampleRate(sample_rate)
                })
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(sample_rate))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate,
            channels = config.channels,
            "audio output initialized"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            running: false,
        })
    }
}

impl OutputSink for CpalSink {
    fn start(&mut self, mut render: RenderFn) -> Result<()> {
        let channels = usize::from(self.config.channels);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render(data, channels);
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        // Some hosts start streams eagerly
        if let Err(e) = stream.pause() {
            tracing::debug!(error = %e, "output stream could not be paused");
        }

        self.stream = Some(stream);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| Error::Audio("output stream not started".to_string()))?;
        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.running = true;

        tracing::debug!("audio output resumed");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Default)]
struct ManualState {
    render: Option<RenderFn>,
    running: bool,
}

/// Headless sink whose frames are pulled explicitly
///
/// Clones share state, so a caller can keep a handle after giving the sink
/// to a graph.
#[derive(Clone)]
pub struct ManualSink {
    state: Arc<Mutex<ManualState>>,
    channels: usize,
}

impl Default for ManualSink {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ManualSink {
    /// Create a sink producing `channels` interleaved channels
    #[must_use]
    pub fn new(channels: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState::default())),
            channels: channels.max(1),
        }
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pull `frames` frames through the render callback
    ///
    /// Returns silence while suspended or before a callback is installed.
    pub fn pump(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames * self.channels];
        let mut state = self.state();
        if state.running
            && let Some(render) = state.render.as_mut()
        {
            render(&mut out, self.channels);
        }
        out
    }

    /// Whether a render callback has been installed
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.state().render.is_some()
    }
}

impl OutputSink for ManualSink {
    fn start(&mut self, render: RenderFn) -> Result<()> {
        self.state().render = Some(render);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.state().running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state().running
    }
}
