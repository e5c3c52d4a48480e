//! Atomic JSON persistence for the project configuration.
//!
//! Writes go to a temp file next to the target, are synced to disk, then
//! renamed over the target. A reader never observes a half-written
//! configuration.

use crate::error::{ForgeError, IoResultExt, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_path(path)?;
    let data: T = serde_json::from_str(&contents).map_err(|e| ForgeError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write data to a JSON file atomically.
///
/// When `keep_backup` is set and the target already exists, the previous
/// content is copied to a `.bak` sibling before the rename.
pub fn write_json<T: Serialize>(path: &Path, data: &T, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
    }

    let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));

    let serialized = serde_json::to_string_pretty(data).map_err(|e| ForgeError::Json {
        message: format!("Failed to serialize data: {}", e),
        source: Some(e),
    })?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_path(&temp_path)?;

        file.write_all(serialized.as_bytes()).with_path(&temp_path)?;
        file.sync_all().with_path(&temp_path)?;
    }

    if keep_backup && path.exists() {
        let backup_path = path.with_extension("json.bak");
        if let Err(e) = fs::copy(path, &backup_path) {
            // Backup failure is not fatal.
            warn!("Failed to create backup {}: {}", backup_path.display(), e);
        }
    }

    fs::rename(&temp_path, path).with_path(path)?;
    debug!("Atomically wrote {}", path.display());
    Ok(())
}
