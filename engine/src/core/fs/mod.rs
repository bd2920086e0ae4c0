//! Filesystem utilities.
//!
//! Crash-tolerant writes for project documents, settings and export
//! manifests: a partial write must never replace a good file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::CoreResult;

/// Staging file next to the destination, removed on drop unless persisted
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    fn beside(dest: &Path) -> Self {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: dest.with_file_name(format!(".{name}.partial")),
            persisted: false,
        }
    }

    fn write(&self, bytes: &[u8]) -> CoreResult<()> {
        let mut file = File::create(&self.path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    }

    /// Moves the staged content over `dest` (rename replaces on every platform std supports)
    fn persist(mut self, dest: &Path) -> CoreResult<()> {
        std::fs::rename(&self.path, dest)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Writes `bytes` to `path`, creating parent directories as needed.
/// Readers see either the old content or the new, never a mix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let staged = StagedFile::beside(path);
    staged.write(bytes)?;
    staged.persist(path)
}

/// Pretty-printed JSON through [`write_atomic`]
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("demo.sniply.json");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        write_atomic(&path, b"good").unwrap();

        // A directory where the staging file should go makes the write fail
        let blocker = StagedFile::beside(&path).path.clone();
        std::fs::create_dir(&blocker).unwrap();
        assert!(write_atomic(&path, b"bad").is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "good");
        assert!(blocker.is_dir());
    }

    #[test]
    fn test_write_json_atomic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        write_json_atomic(&path, &serde_json::json!({ "zoom": 1.5 })).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"zoom\": 1.5"));
    }
}
