//! Cross-Platform Path Utilities
//!
//! Functions for resolving the stash directory (~/.prompt-stash/) and the
//! files inside it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the stash directory (~/.prompt-stash/)
pub fn stash_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".prompt-stash"))
}

/// Get the path of a store key's JSON file (~/.prompt-stash/<key>.json)
pub fn store_key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

/// Get the encrypted secrets file path (~/.prompt-stash/secrets.enc)
pub fn secrets_path() -> AppResult<PathBuf> {
    Ok(stash_dir()?.join("secrets.enc"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the stash directory, creating it if it doesn't exist
pub fn ensure_stash_dir() -> AppResult<PathBuf> {
    let path = stash_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
