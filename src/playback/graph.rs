//! Playback graph: element source → analyser → output sink

use std::sync::Arc;

use super::analyser::Analyser;
use super::element::PlaybackElement;
use super::sink::OutputSink;
use crate::{Error, Result};

/// Whether the graph's output is pulling audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphState {
    /// Built but not yet started (no user-initiated playback so far)
    Suspended,
    Running,
}

/// Proof that an element is wired into a graph
#[derive(Clone, Copy, Debug)]
pub struct SourceHandle(());

/// Audio processing graph owning the output sink and the analyser
///
/// Accepts a single source for its whole lifetime.
pub struct PlaybackGraph {
    sink: Box<dyn OutputSink>,
    analyser: Arc<Analyser>,
    state: GraphState,
    source: Option<SourceHandle>,
}

impl std::fmt::Debug for PlaybackGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackGraph")
            .field("state", &self.state)
            .field("attached", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

impl PlaybackGraph {
    /// Create a suspended graph around an output sink
    #[must_use]
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self {
            sink,
            analyser: Arc::new(Analyser::new()),
            state: GraphState::Suspended,
            source: None,
        }
    }

    /// Connect `element` to the analyser and the analyser to the output
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyAttached` if this graph already has a source or
    /// the element already feeds a graph
    pub fn attach(&mut self, element: &PlaybackElement) -> Result<SourceHandle> {
        if self.source.is_some() || element.is_attached() {
            return Err(Error::AlreadyAttached);
        }

        let source = element.clone();
        let analyser = Arc::clone(&self.analyser);
        self.sink.start(Box::new(move |out, channels| {
            source.render(out, channels);
            analyser.push_interleaved(out, channels);
        }))?;

        if !element.mark_attached() {
            return Err(Error::AlreadyAttached);
        }

        let handle = SourceHandle(());
        self.source = Some(handle);

        tracing::debug!("playback source attached to analyser");
        Ok(handle)
    }

    /// Start the output if suspended; a no-op when already running
    ///
    /// # Errors
    ///
    /// Returns error if the output device refuses to start
    pub fn resume(&mut self) -> Result<()> {
        if self.state == GraphState::Suspended {
            self.sink.resume()?;
            self.state = GraphState::Running;
            tracing::debug!("playback graph resumed");
        }
        Ok(())
    }

    /// Current graph state
    #[must_use]
    pub const fn state(&self) -> GraphState {
        self.state
    }

    /// Whether a source is attached
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Shared analyser fed by the output
    #[must_use]
    pub fn analyser(&self) -> Arc<Analyser> {
        Arc::clone(&self.analyser)
    }
}
