//! Centralized configuration paths
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/webview-commands/`
//! - Windows: `%APPDATA%\webview-commands\`

use std::{env, fs, path::PathBuf};

const APP_DIR: &str = "webview-commands";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/webview-commands`
///   - Else: `~/.config/webview-commands`
///
/// Windows:
///   - `%APPDATA%\webview-commands`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/webview-commands/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/webview-commands/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Ensure the logs directory exists
pub fn ensure_logs_dir() -> std::io::Result<PathBuf> {
    let dir = logs_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory available")
    })?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
