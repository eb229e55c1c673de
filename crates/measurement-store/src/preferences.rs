use crate::error::StoreError;
use crate::kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const ONBOARDING_COMPLETE_KEY: &str = "sound_pollution_onboarding_complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Setting {
    DarkMode,
    Notifications,
    DataSync,
    Location,
}

impl Setting {
    pub const ALL: [Setting; 4] = [
        Setting::DarkMode,
        Setting::Notifications,
        Setting::DataSync,
        Setting::Location,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Setting::DarkMode => "@settings_darkMode",
            Setting::Notifications => "@settings_notifications",
            Setting::DataSync => "@settings_dataSync",
            Setting::Location => "@settings_location",
        }
    }

    pub fn default_value(self) -> bool {
        !matches!(self, Setting::DarkMode)
    }

    pub fn name(self) -> &'static str {
        match self {
            Setting::DarkMode => "darkMode",
            Setting::Notifications => "notifications",
            Setting::DataSync => "dataSync",
            Setting::Location => "location",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Setting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], "").to_ascii_lowercase();
        Setting::ALL
            .into_iter()
            .find(|setting| setting.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown setting: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
    pub data_sync: bool,
    pub location: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: Setting::DarkMode.default_value(),
            notifications: Setting::Notifications.default_value(),
            data_sync: Setting::DataSync.default_value(),
            location: Setting::Location.default_value(),
        }
    }
}

impl Settings {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::DarkMode => self.dark_mode,
            Setting::Notifications => self.notifications,
            Setting::DataSync => self.data_sync,
            Setting::Location => self.location,
        }
    }

    fn set(&mut self, setting: Setting, value: bool) {
        match setting {
            Setting::DarkMode => self.dark_mode = value,
            Setting::Notifications => self.notifications = value,
            Setting::DataSync => self.data_sync = value,
            Setting::Location => self.location = value,
        }
    }
}

/// Onboarding state and settings toggles, stored as `"true"`/`"false"`
/// strings next to the measurement list.
pub struct Preferences<S> {
    kv: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Only the exact string `"true"` counts; read failures count as not done.
    pub fn has_completed_onboarding(&self) -> bool {
        match self.kv.get(ONBOARDING_COMPLETE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "checking onboarding status failed");
                false
            }
        }
    }

    pub fn set_onboarding_complete(&self) -> Result<(), StoreError> {
        self.kv.set(ONBOARDING_COMPLETE_KEY, "true")
    }

    pub fn reset_onboarding(&self) -> Result<(), StoreError> {
        self.kv.remove(ONBOARDING_COMPLETE_KEY)
    }

    pub fn get(&self, setting: Setting) -> bool {
        match self.kv.get(setting.key()) {
            Ok(Some(value)) => value == "true",
            Ok(None) => setting.default_value(),
            Err(e) => {
                warn!(%setting, error = %e, "loading setting failed");
                setting.default_value()
            }
        }
    }

    pub fn load(&self) -> Settings {
        let mut settings = Settings::default();
        for setting in Setting::ALL {
            settings.set(setting, self.get(setting));
        }
        settings
    }

    pub fn set(&self, setting: Setting, value: bool) -> Result<(), StoreError> {
        self.kv.set(setting.key(), if value { "true" } else { "false" })
    }

    /// Flips `setting` and returns the new value.
    pub fn toggle(&self, setting: Setting) -> Result<bool, StoreError> {
        let value = !self.get(setting);
        self.set(setting, value)?;
        Ok(value)
    }
}
