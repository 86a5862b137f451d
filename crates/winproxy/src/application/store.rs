//! The storage seam: where the raw settings blob lives.
//!
//! The [`Settings`](super::settings::Settings) facade only ever needs two
//! operations from the outside world: fetch the raw bytes and replace them.
//! Implementations live in the infrastructure layer (registry, file,
//! in-memory).  Each implementation is responsible for the atomicity of a
//! single call; nothing here locks or retries.

use std::io;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No value is stored at this location yet.
    #[error("no settings stored at {location}")]
    NotFound { location: String },

    /// The caller may not read or write this location.
    #[error("access denied to {location}")]
    AccessDenied { location: String },

    /// The configured backend cannot be used on this platform.
    #[error("storage backend not supported: {0}")]
    Unsupported(String),

    /// Any other I/O failure.
    #[error("I/O error accessing {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classifies an [`io::Error`] from a backend into the storage taxonomy.
    ///
    /// Both the registry and file backends surface failures as `io::Error`,
    /// so `NotFound` and `PermissionDenied` map directly.
    pub fn from_io(location: impl Into<String>, source: io::Error) -> Self {
        let location = location.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { location },
            io::ErrorKind::PermissionDenied => Self::AccessDenied { location },
            _ => Self::Io { location, source },
        }
    }
}

/// Get/set access to the raw `DefaultConnectionSettings` blob.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore {
    /// Returns the stored bytes.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if nothing is stored yet,
    /// [`StorageError::AccessDenied`] on a permission failure.
    fn get_raw(&self) -> Result<Vec<u8>, StorageError>;

    /// Replaces the stored bytes.  Last write wins.
    ///
    /// # Errors
    ///
    /// [`StorageError::AccessDenied`] on a permission failure.
    fn set_raw(&self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn get_raw(&self) -> Result<Vec<u8>, StorageError> {
        (**self).get_raw()
    }

    fn set_raw(&self, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).set_raw(bytes)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
