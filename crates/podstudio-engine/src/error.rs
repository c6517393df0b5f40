//! Playback-level errors.

use podstudio_core::ResolveError;
use thiserror::Error;

use crate::CompileError;

/// A failure inside the streaming worker. Terminal for that session only.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Reading, writing or flushing a stream failed.
    #[error("stream I/O error during {stage}: {cause}")]
    StreamIo {
        /// `read`, `write` or `finish`.
        stage: &'static str,
        /// Backend failure.
        #[source]
        cause: podstudio_io::Error,
    },
}

impl RuntimeError {
    pub(crate) fn io(stage: &'static str, cause: podstudio_io::Error) -> Self {
        RuntimeError::StreamIo { stage, cause }
    }
}

/// Why `play` did not start a session. The engine is left as it was.
#[derive(Debug, Error)]
pub enum PlayError {
    /// No playable path through the graph.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The path resolved but could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A session is already streaming; stop it first.
    #[error("already playing")]
    AlreadyRunning,

    /// The streaming thread could not be started.
    #[error("failed to start streaming thread: {0}")]
    Spawn(#[source] std::io::Error),
}
