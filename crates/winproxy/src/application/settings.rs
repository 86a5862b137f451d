//! The `Settings` facade over a decoded [`RawSettings`] record.
//!
//! # Read, modify, apply
//!
//! ```text
//! Settings::read(store)        store.get_raw() -> decode_settings()
//!   .set_use_proxy(true)       flip one bit, nothing else
//!   .set_proxy_address(..)     replace one string
//!   .apply(store)              version += 1 -> normalize bypass -> encode -> store.set_raw()
//! ```
//!
//! The facade owns its record outright; there is no shared or global state.
//! Each `read` and each `apply` touches the store exactly once.
//!
//! `apply` mutates the in-memory record completely before it writes, so if
//! the write fails the facade is still self-consistent and the caller can
//! simply call `apply` again.  Note that a retry bumps `version` again: the
//! counter moves on every `apply`, whether or not anything else changed.

use thiserror::Error;
use tracing::{debug, info, warn};
use winproxy_core::domain::bypass;
use winproxy_core::{decode_settings, encode_settings, CodecError, ConnectionFlags, Flag, RawSettings};

use super::store::{SettingsStore, StorageError};

/// Error type for facade operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The store holds no settings yet.  Callers usually fall back to
    /// [`Settings::new`]; see [`Settings::read_or_default`].
    #[error("no proxy settings have been stored yet")]
    NotConfigured,

    /// The stored bytes could not be decoded.
    #[error("stored proxy settings are corrupt")]
    CorruptSettings(#[source] CodecError),

    /// The record could not be encoded.
    #[error("failed to encode proxy settings")]
    Encode(#[source] CodecError),

    /// The store refused to read or write.
    #[error(transparent)]
    AccessDenied(StorageError),

    /// Any other storage failure.
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SettingsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => SettingsError::NotConfigured,
            StorageError::AccessDenied { .. } => SettingsError::AccessDenied(err),
            other => SettingsError::Storage(other),
        }
    }
}

/// Where the facade's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsState {
    /// Decoded from the store by [`Settings::read`].
    Loaded,
    /// Created fresh by [`Settings::new`].
    Defaulted,
}

/// Typed view over one [`RawSettings`] record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    raw: RawSettings,
    state: SettingsState,
}

impl Settings {
    /// Creates settings for a profile that has never stored any:
    /// `reserved = 70`, `version = 0`, `flags = Direct`, empty strings.
    pub fn new() -> Self {
        Self {
            raw: RawSettings::new(),
            state: SettingsState::Defaulted,
        }
    }

    /// Wraps an already decoded record.
    pub fn from_raw(raw: RawSettings) -> Self {
        Self {
            raw,
            state: SettingsState::Loaded,
        }
    }

    /// Reads and decodes the settings from `store`.
    ///
    /// Bytes left over after the record are tolerated and logged; they are
    /// not written back by [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// - [`SettingsError::NotConfigured`] if the store has no value.
    /// - [`SettingsError::CorruptSettings`] if the value cannot be decoded.
    /// - [`SettingsError::AccessDenied`] / [`SettingsError::Storage`] for
    ///   store failures.
    pub fn read<S: SettingsStore + ?Sized>(store: &S) -> Result<Self, SettingsError> {
        let bytes = store.get_raw()?;
        debug!(len = bytes.len(), location = %store.location(), "read raw settings");

        let (raw, consumed) = decode_settings(&bytes).map_err(SettingsError::CorruptSettings)?;
        if consumed < bytes.len() {
            warn!(
                count = bytes.len() - consumed,
                location = %store.location(),
                "ignoring trailing bytes after the settings record"
            );
        }

        Ok(Self::from_raw(raw))
    }

    /// Like [`read`](Self::read), but returns [`Settings::new`] when the store
    /// has no value yet.
    ///
    /// # Errors
    ///
    /// Every [`read`](Self::read) error except `NotConfigured`.
    pub fn read_or_default<S: SettingsStore + ?Sized>(store: &S) -> Result<Self, SettingsError> {
        match Self::read(store) {
            Err(SettingsError::NotConfigured) => {
                info!(location = %store.location(), "no stored settings, starting from defaults");
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Persists the settings to `store`.
    ///
    /// Increments `version`, trims the bypass list entries, encodes the record
    /// and writes it with a single `set_raw` call.  The version moves even if
    /// nothing else changed.  Failures are returned, never retried.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Encode`] if a field is too long for the format, or the
    /// storage error from the write.
    pub fn apply<S: SettingsStore + ?Sized>(&mut self, store: &S) -> Result<(), SettingsError> {
        self.raw.version = self.raw.version.wrapping_add(1);
        self.raw.bypass_list = bypass::normalize(&self.raw.bypass_list);

        let bytes = encode_settings(&self.raw).map_err(SettingsError::Encode)?;
        debug!(len = bytes.len(), location = %store.location(), "writing raw settings");
        store.set_raw(&bytes).map_err(|err| match err {
            // A missing location on write is a storage failure.
            StorageError::NotFound { .. } => SettingsError::Storage(err),
            other => SettingsError::from(other),
        })?;

        info!(
            version = self.raw.version,
            flags = %self.raw.flags,
            "applied proxy settings"
        );
        Ok(())
    }

    /// Where the record came from.
    pub fn state(&self) -> SettingsState {
        self.state
    }

    /// The underlying record.
    pub fn raw(&self) -> &RawSettings {
        &self.raw
    }

    /// Consumes the facade and returns the record.
    pub fn into_raw(self) -> RawSettings {
        self.raw
    }

    pub fn version(&self) -> i32 {
        self.raw.version
    }

    pub fn flags(&self) -> ConnectionFlags {
        self.raw.flags
    }

    /// Sets or clears a single flag.
    pub fn set_flag(&mut self, flag: Flag, enabled: bool) {
        self.raw.flags.set(flag.into(), enabled);
    }

    // ── Flags ─────────────────────────────────────────────────────────────────

    pub fn direct(&self) -> bool {
        self.raw.flags.contains(Flag::Direct.into())
    }

    pub fn use_proxy(&self) -> bool {
        self.raw.flags.contains(Flag::Proxy.into())
    }

    pub fn set_use_proxy(&mut self, enabled: bool) {
        self.set_flag(Flag::Proxy, enabled);
    }

    pub fn use_script(&self) -> bool {
        self.raw.flags.contains(Flag::AutoScript.into())
    }

    pub fn set_use_script(&mut self, enabled: bool) {
        self.set_flag(Flag::AutoScript, enabled);
    }

    pub fn auto_detect(&self) -> bool {
        self.raw.flags.contains(Flag::AutoDetect.into())
    }

    pub fn set_auto_detect(&mut self, enabled: bool) {
        self.set_flag(Flag::AutoDetect, enabled);
    }

    // ── Strings ───────────────────────────────────────────────────────────────

    /// The proxy address; invalid UTF-8 is replaced for display.
    pub fn proxy_address(&self) -> String {
        String::from_utf8_lossy(&self.raw.proxy_address).into_owned()
    }

    pub fn set_proxy_address(&mut self, address: &str) {
        self.raw.proxy_address = address.as_bytes().to_vec();
    }

    /// The auto-configuration script URL; invalid UTF-8 is replaced for display.
    pub fn script_address(&self) -> String {
        String::from_utf8_lossy(&self.raw.script_address).into_owned()
    }

    pub fn set_script_address(&mut self, address: &str) {
        self.raw.script_address = address.as_bytes().to_vec();
    }

    /// The bypass list split on `;` with each entry trimmed.
    pub fn bypass_list(&self) -> Vec<String> {
        bypass::split(&String::from_utf8_lossy(&self.raw.bypass_list))
    }

    /// Replaces the bypass list.  Entries are trimmed and joined with `;`.
    pub fn set_bypass_list<S: AsRef<str>>(&mut self, entries: &[S]) {
        self.raw.bypass_list = bypass::join(entries).into_bytes();
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
