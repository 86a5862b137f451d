//! File-backed settings store.
//!
//! Holds the blob exactly as the registry would.  Used on hosts without a
//! registry and by `export` / `import`.
//!
//! Writes go to a sibling temporary file which is then renamed over the
//! target, so a reader never observes a half-written blob.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::store::{SettingsStore, StorageError};

/// A [`SettingsStore`] that keeps the blob in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, source: std::io::Error) -> StorageError {
        StorageError::from_io(self.location(), source)
    }
}

impl SettingsStore for FileStore {
    fn get_raw(&self) -> Result<Vec<u8>, StorageError> {
        let bytes = fs::read(&self.path).map_err(|e| self.error(e))?;
        debug!(path = %self.path.display(), len = bytes.len(), "read settings file");
        Ok(bytes)
    }

    fn set_raw(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.error(e))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|e| self.error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            self.error(e)
        })?;

        debug!(path = %self.path.display(), len = bytes.len(), "wrote settings file");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("absent.bin"));

        let result = store.get_raw();

        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_write_then_read_round_trips() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("settings.bin"));

        // Act
        store.set_raw(&[0x46, 0, 0, 0, 1]).expect("write");
        let bytes = store.get_raw().expect("read");

        // Assert
        assert_eq!(bytes, vec![0x46, 0, 0, 0, 1]);
        assert!(!store.temp_path().exists(), "temp file must be renamed away");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b").join("settings.bin");
        let store = FileStore::new(&path);

        store.set_raw(b"x").expect("write");

        assert!(path.exists());
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("settings.bin"));

        store.set_raw(b"first, longer value").expect("write");
        store.set_raw(b"second").expect("write");

        assert_eq!(store.get_raw().expect("read"), b"second".to_vec());
    }

    #[test]
    fn test_location_is_the_path() {
        let store = FileStore::new("some/dir/settings.bin");
        assert_eq!(store.path(), Path::new("some/dir/settings.bin"));
        assert!(store.location().ends_with("settings.bin"));
    }
}
