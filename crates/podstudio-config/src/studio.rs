//! The `StudioConfig` document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::paths;

/// Which audio backend drives playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// System audio devices through cpal; sources are WAV files.
    #[default]
    Cpal,
    /// In-memory streams, for headless runs.
    Memory,
}

/// `[audio]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Backend selection.
    pub backend: BackendKind,
    /// Device used when an Output node has none set.
    pub output_device: String,
    /// Frames per streaming buffer.
    pub buffer_frames: usize,
    /// Device-output buffers in flight.
    pub queue_depth: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Cpal,
            output_device: "default".to_string(),
            buffer_frames: 1024,
            queue_depth: 4,
        }
    }
}

/// `[menu]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// How many registry entries are offered when picking an effect.
    pub effect_entries: usize,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self { effect_entries: 10 }
    }
}

/// `[input]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// File extensions accepted as sources, without the dot.
    pub extensions: Vec<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["wav".to_string()],
        }
    }
}

impl InputSettings {
    /// Returns true if `path` has one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` env-filter directive.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete studio configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Audio backend and streaming settings.
    pub audio: AudioSettings,
    /// Effect picker settings.
    pub menu: MenuSettings,
    /// Source file settings.
    pub input: InputSettings,
    /// Log filter.
    pub logging: LoggingSettings,
}

impl StudioConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load the user's config file, or defaults when it does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_or_default_from(paths::user_config_file())
    }

    /// Load `path`, or defaults when it does not exist.
    pub fn load_or_default_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.buffer_frames == 0 {
            return Err(ConfigError::invalid("audio.buffer_frames", "must be at least 1"));
        }
        if self.audio.queue_depth == 0 {
            return Err(ConfigError::invalid("audio.queue_depth", "must be at least 1"));
        }
        if self.audio.output_device.trim().is_empty() {
            return Err(ConfigError::invalid("audio.output_device", "must not be empty"));
        }
        if self.menu.effect_entries == 0 {
            return Err(ConfigError::invalid("menu.effect_entries", "must be at least 1"));
        }
        if self.input.extensions.is_empty() {
            return Err(ConfigError::invalid("input.extensions", "must list at least one extension"));
        }
        Ok(())
    }
}
