//! Playback and visualization
//!
//! A [`PlaybackElement`] holds the decoded clip and play head. The
//! [`PlaybackBridge`] builds a [`PlaybackGraph`] around it once (element →
//! analyser → output sink) and animates the spectrum while it plays.

mod analyser;
mod bridge;
mod element;
mod graph;
mod sink;

pub use analyser::{Analyser, BIN_COUNT, FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING};
pub use bridge::{BridgeState, CancelToken, PlaybackBridge};
pub use element::{PlaybackElement, PlaybackEvent, read_wav_file};
pub use graph::{GraphState, PlaybackGraph, SourceHandle};
pub use sink::{CpalSink, ManualSink, OutputSink, RenderFn};
