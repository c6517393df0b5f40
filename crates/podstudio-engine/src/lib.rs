//! Chain compilation and background playback for podstudio.
//!
//! ```text
//! GraphStore ──resolve──▶ ResolvedPath ──ChainCompiler──▶ CompiledChain
//!                                                            │ moved
//!                                                            ▼
//!                                          PlaybackEngine worker thread
//! ```
//!
//! [`Studio`] bundles a graph, an effect registry and an engine behind the
//! editor-facing operations: node edits plus `play`, `stop` and `status`.

mod compiler;
mod engine;
mod error;
mod studio;

pub use compiler::{ChainCompiler, CompileError, CompiledChain, Stage};
pub use engine::{EVENT_QUEUE_DEPTH, PlaybackEngine, PlaybackEvent, Status};
pub use error::{PlayError, RuntimeError};
pub use studio::Studio;
