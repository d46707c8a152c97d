//! XDG-style path utilities for settings, data and the notes folder.
//!
//! Paths prefer XDG Base Directory conventions over OS-specific locations
//! so the layout is the same on every platform.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "oxygen";

/// Default notes folder name under the home directory.
const NOTES_DIR: &str = "oxygen2";

/// Returns the settings directory.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/oxygen` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/oxygen` otherwise
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Returns the data directory holding the vocabulary database.
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/oxygen` if `XDG_DATA_HOME` is set
/// 2. `~/.local/share/oxygen` otherwise
pub fn data_dir() -> Result<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

/// Returns the notes folder.
///
/// Resolution order:
/// 1. `$OXYGEN_HOME` if set
/// 2. `~/oxygen2` otherwise
pub fn notes_dir() -> Result<PathBuf> {
    match std::env::var("OXYGEN_HOME") {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(home_dir()?.join(NOTES_DIR)),
    }
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Result<PathBuf> {
    match std::env::var(var) {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir).join(APP_DIR)),
        _ => {
            let mut path = home_dir()?;
            path.extend(fallback);
            Ok(path.join(APP_DIR))
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Failed to determine home directory")
}
