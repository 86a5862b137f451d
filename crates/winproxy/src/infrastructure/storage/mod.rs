//! Storage infrastructure: implementations of [`SettingsStore`].
//!
//! | Module     | Backend                                               |
//! |------------|-------------------------------------------------------|
//! | `registry` | `HKCU\...\Internet Settings\Connections` (Windows)    |
//! | `file`     | A plain file holding the blob, on any platform        |
//! | `mock`     | In-memory store for tests, with failure injection     |
//!
//! [`open_store`] picks the backend from the loaded configuration.

use std::path::PathBuf;

use tracing::debug;

use crate::application::store::{SettingsStore, StorageError};
use crate::infrastructure::config::{StorageBackend, StorageConfig};

pub mod file;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod registry;

pub use file::FileStore;
pub use mock::MemoryStore;

/// Registry key holding the connection settings, relative to `HKEY_CURRENT_USER`.
pub const CONNECTIONS_KEY_PATH: &str =
    r"Software\Microsoft\Windows\CurrentVersion\Internet Settings\Connections";

/// Registry value used by the default LAN connection.
pub const DEFAULT_VALUE_NAME: &str = "DefaultConnectionSettings";

/// Opens the store described by `config`.
///
/// `file_override` takes precedence over the configured backend and is used
/// for `--store-file`.
///
/// # Errors
///
/// Returns [`StorageError::Unsupported`] when the registry backend is
/// requested on a platform without a registry.
pub fn open_store(
    config: &StorageConfig,
    file_override: Option<PathBuf>,
) -> Result<Box<dyn SettingsStore>, StorageError> {
    if let Some(path) = file_override {
        debug!(path = %path.display(), "using file store from command line");
        return Ok(Box::new(FileStore::new(path)));
    }

    match config.backend {
        StorageBackend::File => {
            let path = config.resolved_path();
            debug!(path = %path.display(), "using file store");
            Ok(Box::new(FileStore::new(path)))
        }
        StorageBackend::Registry => open_registry(config),
    }
}

#[cfg(target_os = "windows")]
fn open_registry(config: &StorageConfig) -> Result<Box<dyn SettingsStore>, StorageError> {
    debug!(value = %config.value_name, "using registry store");
    Ok(Box::new(registry::RegistryStore::new(
        CONNECTIONS_KEY_PATH,
        &config.value_name,
    )))
}

#[cfg(not(target_os = "windows"))]
fn open_registry(_config: &StorageConfig) -> Result<Box<dyn SettingsStore>, StorageError> {
    Err(StorageError::Unsupported(
        "the registry backend is only available on Windows; use --store-file or backend = \"file\""
            .to_string(),
    ))
}
