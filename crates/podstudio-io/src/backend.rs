//! Pluggable audio backend abstraction.
//!
//! An [`AudioBackend`] turns a source string into an [`InputStream`] and a
//! device string into an [`OutputStream`]. Streams are plain owned values:
//! dropping one closes it, so every handle is released exactly once.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │     Chain compiler / worker      │
//! └──────────────┬───────────────────┘
//!                │ uses AudioBackend trait
//!                ▼
//! ┌──────────────────────────────────┐
//! │        AudioBackend trait        │
//! │  open_read / open_write / list   │
//! └──────────────┬───────────────────┘
//!                │ implemented by
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌───────────────┐
//! │ CpalBackend │  │ MemoryBackend │
//! └─────────────┘  └───────────────┘
//! ```
//!
//! Streams are `Send` because a compiled chain is built on the controller
//! thread and then moved onto the streaming worker.

use crate::{Result, SignalSpec};

/// Audio device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the system default output.
    pub is_default: bool,
    /// Default sample rate in Hz, when the backend knows it.
    pub default_sample_rate: Option<u32>,
}

/// A readable stream of interleaved `f32` samples.
pub trait InputStream: Send {
    /// Format of the samples this stream yields.
    fn spec(&self) -> SignalSpec;

    /// Fill `buf` with up to `buf.len()` interleaved samples.
    ///
    /// Returns the number of samples written; `0` means end of input.
    fn read(&mut self, buf: &mut [f32]) -> Result<usize>;

    /// Short human-readable description (file path, source name).
    fn description(&self) -> String;
}

/// A writable stream of interleaved `f32` samples.
pub trait OutputStream: Send {
    /// Queue interleaved samples for output.
    ///
    /// May block to apply backpressure; samples use the format the
    /// stream was opened with.
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Flush everything written so far. Called once at end of input.
    fn finish(&mut self) -> Result<()>;

    /// Short human-readable description (device name, file path).
    fn description(&self) -> String;
}

/// Pluggable audio backend trait.
///
/// ## Object Safety
///
/// This trait is object-safe; the engine holds an `Arc<dyn AudioBackend>`
/// chosen at start-up from configuration.
pub trait AudioBackend: Send + Sync {
    /// Human-readable name of this backend (e.g., "cpal", "memory").
    fn name(&self) -> &str;

    /// Open a source for reading.
    fn open_read(&self, source: &str) -> Result<Box<dyn InputStream>>;

    /// Open a device for writing samples in `spec` format.
    ///
    /// `"default"` selects the backend's default device.
    fn open_write(&self, device: &str, spec: SignalSpec) -> Result<Box<dyn OutputStream>>;

    /// List output devices.
    fn output_devices(&self) -> Result<Vec<AudioDevice>>;
}

/// Device name that selects the backend default.
pub const DEFAULT_DEVICE: &str = "default";
