//! Windows registry settings store.
//!
//! Reads and writes a `REG_BINARY` value under `HKEY_CURRENT_USER`.  The key
//! is opened per call with only the access right the call needs
//! (`KEY_QUERY_VALUE` or `KEY_SET_VALUE`) and closed again when the `RegKey`
//! drops.  The key itself is never created: Windows creates `Connections`
//! for every profile, and a missing key is reported as `NotFound`.

#![cfg(target_os = "windows")]

use tracing::{debug, warn};
use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_BINARY};
use winreg::{RegKey, RegValue};

use crate::application::store::{SettingsStore, StorageError};

/// A [`SettingsStore`] over one binary value in `HKEY_CURRENT_USER`.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    key_path: String,
    value_name: String,
}

impl RegistryStore {
    /// Creates a store for `value_name` under `HKCU\key_path`.
    pub fn new(key_path: &str, value_name: &str) -> Self {
        Self {
            key_path: key_path.to_string(),
            value_name: value_name.to_string(),
        }
    }

    fn open(&self, access: u32) -> Result<RegKey, StorageError> {
        RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(&self.key_path, access)
            .map_err(|e| StorageError::from_io(self.location(), e))
    }
}

impl SettingsStore for RegistryStore {
    fn get_raw(&self) -> Result<Vec<u8>, StorageError> {
        let key = self.open(KEY_QUERY_VALUE)?;
        let value = key
            .get_raw_value(&self.value_name)
            .map_err(|e| StorageError::from_io(self.location(), e))?;

        if value.vtype != REG_BINARY {
            warn!(
                value = %self.value_name,
                vtype = ?value.vtype,
                "registry value is not REG_BINARY; decoding its bytes anyway"
            );
        }
        debug!(value = %self.value_name, len = value.bytes.len(), "read registry value");
        Ok(value.bytes)
    }

    fn set_raw(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let key = self.open(KEY_SET_VALUE)?;
        let value = RegValue {
            bytes: bytes.to_vec(),
            vtype: REG_BINARY,
        };
        key.set_raw_value(&self.value_name, &value)
            .map_err(|e| StorageError::from_io(self.location(), e))?;

        debug!(value = %self.value_name, len = bytes.len(), "wrote registry value");
        Ok(())
    }

    fn location(&self) -> String {
        format!("HKCU\\{}\\{}", self.key_path, self.value_name)
    }
}
