//! Playback and visualization bridge
//!
//! Lazily builds the playback graph around one element, and while the element
//! plays runs a cancellable animation task that samples the analyser and draws
//! bars. When playback stops the task is cancelled and a flat baseline drawn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::analyser::Analyser;
use super::element::PlaybackElement;
use super::graph::{GraphState, PlaybackGraph};
use super::sink::OutputSink;
use crate::Error;
use crate::visualizer::{self, Surface};

/// Bridge lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    /// No graph built yet
    Uninitialized,
    /// Graph built and the element wired through the analyser
    Attached,
}

/// Cooperative cancellation flag checked by the animation task
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct FrameTask {
    token: CancelToken,
    handle: JoinHandle<()>,
}

/// Drives a [`Surface`] from the analyser of one playback element
pub struct PlaybackBridge<S: Surface + Send + 'static> {
    element: PlaybackElement,
    surface: Arc<Mutex<S>>,
    sink: Option<Box<dyn OutputSink>>,
    graph: Option<PlaybackGraph>,
    frame: Option<FrameTask>,
    frame_interval: Duration,
    playing: Option<bool>,
}

fn lock<S>(surface: &Mutex<S>) -> MutexGuard<'_, S> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: Surface + Send + 'static> PlaybackBridge<S> {
    /// Create a bridge; the graph is only built on first use
    pub fn new(
        element: PlaybackElement,
        surface: S,
        sink: Box<dyn OutputSink>,
        frame_interval: Duration,
    ) -> Self {
        Self {
            element,
            surface: Arc::new(Mutex::new(surface)),
            sink: Some(sink),
            graph: None,
            frame: None,
            frame_interval,
            playing: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> BridgeState {
        if self.graph.is_some() {
            BridgeState::Attached
        } else {
            BridgeState::Uninitialized
        }
    }

    /// Shared handle to the drawing surface
    #[must_use]
    pub fn surface(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.surface)
    }

    /// The graph, once built
    #[must_use]
    pub const fn graph(&self) -> Option<&PlaybackGraph> {
        self.graph.as_ref()
    }

    /// Whether an animation task is armed
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.frame.is_some()
    }

    /// Build the graph and attach the element, at most once
    ///
    /// Attach failures are logged and swallowed.
    pub fn attach(&mut self) {
        if self.graph.is_none() {
            let Some(sink) = self.sink.take() else {
                return;
            };
            self.graph = Some(PlaybackGraph::new(sink));
        }

        let Some(graph) = self.graph.as_mut() else {
            return;
        };

        match graph.attach(&self.element) {
            Ok(_) => tracing::debug!("visualizer attached"),
            Err(Error::AlreadyAttached) => {
                tracing::warn!("playback source already connected, keeping existing graph");
            }
            Err(e) => tracing::warn!(error = %e, "failed to connect playback source"),
        }
    }

    /// React to a playing / not-playing transition
    ///
    /// Repeated calls with the same value are ignored.
    pub fn set_playing(&mut self, playing: bool) {
        if self.playing == Some(playing) {
            return;
        }
        self.playing = Some(playing);

        if playing {
            self.start_animation();
        } else {
            self.stop_animation();
        }
    }

    fn start_animation(&mut self) {
        if self.graph.as_ref().is_none_or(|g| !g.is_attached()) {
            self.attach();
        }

        let Some(graph) = self.graph.as_mut() else {
            return;
        };

        if graph.state() == GraphState::Suspended
            && let Err(e) = graph.resume()
        {
            tracing::warn!(error = %e, "failed to resume playback graph");
        }
        let analyser = graph.analyser();

        self.cancel_frame();

        let token = CancelToken::default();
        let handle = tokio::spawn(animate(
            analyser,
            Arc::clone(&self.surface),
            self.frame_interval,
            token.clone(),
        ));

        self.frame = Some(FrameTask { token, handle });
    }

    fn stop_animation(&mut self) {
        self.cancel_frame();

        let mut surface = lock(&self.surface);
        visualizer::draw_baseline(&mut *surface);
        surface.present();
    }

    fn cancel_frame(&mut self) {
        if let Some(task) = self.frame.take() {
            task.token.cancel();
            task.handle.abort();
        }
    }
}

impl<S: Surface + Send + 'static> Drop for PlaybackBridge<S> {
    fn drop(&mut self) {
        self.cancel_frame();
    }
}

/// Animation loop: one frame per tick until cancelled
async fn animate<S: Surface + Send>(
    analyser: Arc<Analyser>,
    surface: Arc<Mutex<S>>,
    interval: Duration,
    token: CancelToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut bins = vec![0u8; analyser.bin_count()];

    loop {
        ticker.tick().await;
        if token.is_cancelled() {
            break;
        }

        analyser.get_byte_frequency_data(&mut bins);

        let mut surface = lock(&surface);
        // Cancellation may have raced the lock; the baseline must win
        if token.is_cancelled() {
            break;
        }
        visualizer::draw_bars(&mut *surface, &bins);
        surface.present();
    }
}
