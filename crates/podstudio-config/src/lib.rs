//! Configuration for podstudio.
//!
//! All settings live in one TOML file, `config.toml` in the user config
//! directory. Every field has a default, so a missing file or a file with only
//! some sections is valid.
//!
//! # Example
//!
//! ```rust
//! use podstudio_config::{BackendKind, StudioConfig};
//!
//! let config = StudioConfig::from_toml(r#"
//!     [audio]
//!     backend = "memory"
//!     buffer_frames = 256
//! "#).unwrap();
//!
//! assert_eq!(config.audio.backend, BackendKind::Memory);
//! assert_eq!(config.audio.output_device, "default");
//! assert_eq!(config.menu.effect_entries, 10);
//! ```

mod error;
pub mod paths;
mod studio;

pub use error::ConfigError;
pub use studio::{AudioSettings, BackendKind, InputSettings, LoggingSettings, MenuSettings, StudioConfig};
