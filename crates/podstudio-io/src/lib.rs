//! Audio I/O layer for podstudio.
//!
//! This crate provides:
//!
//! - **Backend abstraction**: [`AudioBackend`] opens [`InputStream`]s from
//!   sources and [`OutputStream`]s on devices
//! - **cpal backend**: [`CpalBackend`] reads WAV files and plays through the
//!   system's audio devices
//! - **Memory backend**: [`MemoryBackend`] for tests and headless runs
//! - **WAV streaming**: [`WavFileReader`] and [`WavFileWriter`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use podstudio_io::{AudioBackend, CpalBackend};
//!
//! let backend = CpalBackend::new(Default::default());
//! let mut input = backend.open_read("episode.wav")?;
//! let mut output = backend.open_write("default", input.spec())?;
//!
//! let mut buf = vec![0.0; 2048];
//! loop {
//!     let n = input.read(&mut buf)?;
//!     if n == 0 {
//!         break;
//!     }
//!     output.write(&buf[..n])?;
//! }
//! output.finish()?;
//! ```

pub mod backend;
pub mod cpal_backend;
mod format;
pub mod memory;
mod wav;

pub use backend::{AudioBackend, AudioDevice, DEFAULT_DEVICE, InputStream, OutputStream};
pub use cpal_backend::{CpalBackend, CpalOptions};
pub use format::SignalSpec;
pub use memory::MemoryBackend;
pub use wav::{WavFileReader, WavFileWriter, is_wav_path, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The requested input source does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
