//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/podstudio/config.toml`
//! - macOS: `~/Library/Application Support/podstudio/config.toml`
//! - Windows: `%APPDATA%\podstudio\config.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "podstudio";

/// File name of the main configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the working directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user's `config.toml`.
pub fn user_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_app_dir() {
        let file = user_config_file();
        assert!(file.ends_with("podstudio/config.toml"));
        assert_eq!(file.parent(), Some(user_config_dir().as_path()));
    }
}
