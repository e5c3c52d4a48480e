//! Filesystem probe for model install paths.

use crate::error::{IoResultExt, Result};
use std::path::Path;

/// Whether a model is physically present at `path`.
///
/// An existing but empty directory counts as absent: interrupted
/// downloads leave empty directories behind and those must not block a
/// fresh acquisition.
pub fn present_on_disk(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if path.is_file() {
        return Ok(true);
    }

    let mut entries = std::fs::read_dir(path).with_path(path)?;
    Ok(entries.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_is_absent() {
        let dir = TempDir::new().unwrap();
        assert!(!present_on_disk(&dir.path().join("nope")).unwrap());
    }

    #[test]
    fn test_empty_directory_is_absent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("empty");
        std::fs::create_dir(&target).unwrap();
        assert!(!present_on_disk(&target).unwrap());
    }

    #[test]
    fn test_populated_directory_is_present() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("model");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("weights.bin"), b"w").unwrap();
        assert!(present_on_disk(&target).unwrap());
    }

    #[test]
    fn test_plain_file_is_present() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("model.gguf");
        std::fs::write(&target, b"w").unwrap();
        assert!(present_on_disk(&target).unwrap());
    }
}
