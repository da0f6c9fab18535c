//! # Store Settings
//!
//! Where the store keeps its data and how it announces changes.
//!
//! Settings come from defaults, a settings file, environment variables and
//! command-line flags; see [`crate::precedence`] for how they combine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

pub const DEFAULT_DOMAIN: &str = "com.projectx.hookprefs";
pub const DEFAULT_NOTIFICATION: &str = "com.projectx.hookprefs.changed";

/// Settings for opening a file-backed store.
///
/// ## Fields
/// - `domain`: key-value domain identifier; names the storage document
/// - `notification_name`: change notification identifier; names the signal file
/// - `storage_dir`: directory shared by every process using the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StoreSettings {
    #[serde(default = "default_domain")]
    #[validate(length(min = 1, max = 255))]
    pub domain: String,

    #[serde(default = "default_notification")]
    #[validate(length(min = 1, max = 255))]
    pub notification_name: String,

    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            notification_name: default_notification(),
            storage_dir: default_storage_dir(),
        }
    }
}

/// Settings named explicitly by one source (environment or command line).
///
/// A `Some` field wins over every lower-priority source, even when it
/// equals the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub domain: Option<String>,
    pub notification_name: Option<String>,
    pub storage_dir: Option<PathBuf>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.notification_name.is_none() && self.storage_dir.is_none()
    }
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_notification() -> String {
    DEFAULT_NOTIFICATION.to_string()
}

/// `<platform preference dir>/hookprefs`, or the temp dir on platforms without one.
pub fn default_storage_dir() -> PathBuf {
    dirs::preference_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hookprefs")
}

/// Validate settings before opening a store.
pub fn validate(settings: &StoreSettings) -> Result<(), validator::ValidationErrors> {
    settings.validate()
}
