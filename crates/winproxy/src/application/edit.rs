//! SettingsEdit: a batch of optional changes to a [`Settings`] facade.
//!
//! The CLI collects whatever the user asked to change into one
//! `SettingsEdit`, applies it to the facade, and only then calls
//! [`Settings::apply`].  Fields left as `None` are not touched.

use super::settings::Settings;

/// Optional new values for each user-facing setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsEdit {
    pub use_proxy: Option<bool>,
    pub use_script: Option<bool>,
    pub auto_detect: Option<bool>,
    pub proxy_address: Option<String>,
    pub script_address: Option<String>,
    pub bypass_list: Option<Vec<String>>,
}

impl SettingsEdit {
    /// An edit that only switches the explicit proxy on or off.
    pub fn toggle_proxy(enabled: bool) -> Self {
        Self {
            use_proxy: Some(enabled),
            ..Self::default()
        }
    }

    /// Returns `true` if at least one field would be changed.
    pub fn has_changes(&self) -> bool {
        self != &Self::default()
    }

    /// Writes every set field into `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(enabled) = self.use_proxy {
            settings.set_use_proxy(enabled);
        }
        if let Some(enabled) = self.use_script {
            settings.set_use_script(enabled);
        }
        if let Some(enabled) = self.auto_detect {
            settings.set_auto_detect(enabled);
        }
        if let Some(address) = &self.proxy_address {
            settings.set_proxy_address(address);
        }
        if let Some(address) = &self.script_address {
            settings.set_script_address(address);
        }
        if let Some(entries) = &self.bypass_list {
            settings.set_bypass_list(entries);
        }
    }
}
