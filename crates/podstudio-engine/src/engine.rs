//! Background playback with cooperative cancellation.
//!
//! ```text
//!            play()                    worker ends
//!   Idle ──────────────▶ Running ─────────────────▶ Finished | Cancelled | Failed
//!    ▲                                                      │
//!    └──────────── release (next play() or dispose()) ◀─────┘
//! ```
//!
//! The controller and the worker share exactly two atomics: the cancel flag
//! (written by [`PlaybackEngine::stop`]) and the terminal status (written once
//! by the worker). The [`CompiledChain`] moves into the worker and comes back
//! through its `JoinHandle`, so release always happens on the controller
//! thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use podstudio_core::{GraphStore, ResolveError, resolve_playable_path};

use crate::compiler::{ChainCompiler, CompiledChain, Stage, StreamEnd};
use crate::PlayError;

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// No chain held.
    Idle = 0,
    /// A worker is streaming.
    Running = 1,
    /// Input was exhausted and the output flushed.
    Finished = 2,
    /// Stopped on request.
    Cancelled = 3,
    /// A stream I/O error ended the session.
    Failed = 4,
}

impl Status {
    fn from_u8(code: u8) -> Self {
        match code {
            1 => Status::Running,
            2 => Status::Finished,
            3 => Status::Cancelled,
            4 => Status::Failed,
            _ => Status::Idle,
        }
    }

    /// Finished, Cancelled or Failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Cancelled | Status::Failed)
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Finished => "finished",
            Status::Cancelled => "cancelled",
            Status::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Notifications about playback, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A chain compiled and its worker started.
    Started {
        /// The compiled pipeline.
        stages: Vec<Stage>,
    },
    /// `play` found no playable path.
    ResolveFailed(ResolveError),
    /// `play` resolved a path but could not compile it.
    CompileFailed(String),
    /// The input was exhausted.
    Finished,
    /// The worker observed `stop`.
    Cancelled,
    /// A stream I/O error ended the session.
    Failed(String),
    /// The terminal chain's handles were released.
    Released,
}

/// Events kept for a slow or absent reader. Past this the oldest is dropped.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Bounded event queue shared by the controller and the worker.
///
/// Holds its own receiver so a full queue can shed its oldest event; the
/// newest state change is always delivered.
#[derive(Clone)]
struct EventQueue {
    tx: Sender<PlaybackEvent>,
    rx: Receiver<PlaybackEvent>,
}

impl EventQueue {
    fn new() -> Self {
        let (tx, rx) = bounded(EVENT_QUEUE_DEPTH);
        Self { tx, rx }
    }

    fn push(&self, mut event: PlaybackEvent) {
        loop {
            match self.tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(back)) => {
                    let _ = self.rx.try_recv();
                    event = back;
                }
            }
        }
    }
}

struct Session {
    cancel: Arc<AtomicBool>,
    status: Arc<AtomicU8>,
    worker: JoinHandle<CompiledChain>,
}

impl Session {
    fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }
}

/// Owns at most one streaming session.
pub struct PlaybackEngine {
    compiler: ChainCompiler,
    buffer_frames: usize,
    session: Option<Session>,
    events: EventQueue,
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("compiler", &self.compiler)
            .field("buffer_frames", &self.buffer_frames)
            .field("status", &self.status())
            .finish()
    }
}

impl PlaybackEngine {
    /// Create an idle engine streaming `buffer_frames` frames per buffer.
    pub fn new(compiler: ChainCompiler, buffer_frames: usize) -> Self {
        Self {
            compiler,
            buffer_frames: buffer_frames.max(1),
            session: None,
            events: EventQueue::new(),
        }
    }

    /// The compiler chains are built with.
    pub fn compiler(&self) -> &ChainCompiler {
        &self.compiler
    }

    /// Resolve, compile and start streaming `graph`.
    ///
    /// Returns once the worker is running. A terminal chain from the previous
    /// session is released first. While a session is running the call is
    /// rejected with [`PlayError::AlreadyRunning`] and nothing changes.
    pub fn play(&mut self, graph: &GraphStore) -> Result<(), PlayError> {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.status() == Status::Running)
        {
            tracing::warn!("play rejected: already running");
            return Err(PlayError::AlreadyRunning);
        }
        self.release_terminal();

        let path = resolve_playable_path(graph).map_err(|err| {
            tracing::warn!(error = %err, "nothing to play");
            self.notify(PlaybackEvent::ResolveFailed(err));
            err
        })?;

        tracing::info!(nodes = path.len(), "compiling");
        let chain = self.compiler.compile(&path).map_err(|err| {
            tracing::warn!(error = %err, "compile failed");
            self.notify(PlaybackEvent::CompileFailed(err.to_string()));
            err
        })?;
        let stages = chain.stages().to_vec();

        let cancel = Arc::new(AtomicBool::new(false));
        let status = Arc::new(AtomicU8::new(Status::Running as u8));
        let worker = {
            let cancel = Arc::clone(&cancel);
            let status = Arc::clone(&status);
            let events = self.events.clone();
            let buffer_frames = self.buffer_frames;
            std::thread::Builder::new()
                .name("podstudio-stream".into())
                .spawn(move || stream(chain, &cancel, &status, &events, buffer_frames))
                .map_err(PlayError::Spawn)?
        };

        tracing::info!(
            chain = %stages.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> "),
            "running"
        );
        self.notify(PlaybackEvent::Started { stages });
        self.session = Some(Session {
            cancel,
            status,
            worker,
        });
        Ok(())
    }

    /// Ask the worker to stop after its current buffer.
    ///
    /// Never blocks; repeated calls and calls while idle do nothing more.
    pub fn stop(&self) {
        if let Some(session) = &self.session
            && !session.cancel.swap(true, Ordering::AcqRel)
        {
            tracing::debug!("stop requested");
        }
    }

    /// Current state. Cheap enough to poll every UI frame.
    pub fn status(&self) -> Status {
        self.session.as_ref().map_or(Status::Idle, Session::status)
    }

    /// Receiver for [`PlaybackEvent`]s. Each clone competes for events.
    ///
    /// At most [`EVENT_QUEUE_DEPTH`] events wait; an undrained receiver
    /// loses the oldest ones first.
    pub fn events(&self) -> Receiver<PlaybackEvent> {
        self.events.rx.clone()
    }

    /// Stop any running session, wait for it, and release its chain.
    ///
    /// Afterwards the engine is idle. Called on drop.
    pub fn dispose(&mut self) {
        if let Some(session) = &self.session {
            session.cancel.store(true, Ordering::Release);
        }
        self.release_session();
    }

    fn release_terminal(&mut self) {
        if self.session.as_ref().is_some_and(|s| s.status().is_terminal()) {
            self.release_session();
        }
    }

    fn release_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match session.worker.join() {
            Ok(chain) => chain.release(),
            // The chain was dropped while unwinding; its handles are gone.
            Err(_) => tracing::error!("streaming worker panicked"),
        }
        self.notify(PlaybackEvent::Released);
    }

    fn notify(&self, event: PlaybackEvent) {
        self.events.push(event);
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Worker body: stream, publish the terminal status, hand the chain back.
fn stream(
    mut chain: CompiledChain,
    cancel: &AtomicBool,
    status: &AtomicU8,
    events: &EventQueue,
    buffer_frames: usize,
) -> CompiledChain {
    let (terminal, event) = match chain.pump(cancel, buffer_frames) {
        Ok(StreamEnd::Finished) => {
            tracing::info!("finished");
            (Status::Finished, PlaybackEvent::Finished)
        }
        Ok(StreamEnd::Cancelled) => {
            tracing::info!("cancelled");
            (Status::Cancelled, PlaybackEvent::Cancelled)
        }
        Err(err) => {
            tracing::error!(error = %err, "failed");
            (Status::Failed, PlaybackEvent::Failed(err.to_string()))
        }
    };
    status.store(terminal as u8, Ordering::Release);
    events.push(event);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_roundtrip() {
        for status in [
            Status::Idle,
            Status::Running,
            Status::Finished,
            Status::Cancelled,
            Status::Failed,
        ] {
            assert_eq!(Status::from_u8(status as u8), status);
        }
        assert!(!Status::Running.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert_eq!(Status::Failed.to_string(), "failed");
    }

    #[test]
    fn full_event_queue_drops_oldest() {
        let queue = EventQueue::new();
        queue.push(PlaybackEvent::Cancelled);
        for _ in 0..EVENT_QUEUE_DEPTH * 3 {
            queue.push(PlaybackEvent::Released);
        }
        queue.push(PlaybackEvent::Finished);

        assert_eq!(queue.rx.len(), EVENT_QUEUE_DEPTH);
        let drained: Vec<_> = queue.rx.try_iter().collect();
        assert!(!drained.contains(&PlaybackEvent::Cancelled));
        assert_eq!(drained.last(), Some(&PlaybackEvent::Finished));
    }
}
