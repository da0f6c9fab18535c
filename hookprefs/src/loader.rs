//! # Environment Variable Loader
//!
//! - `HOOKPREFS_DOMAIN`: key-value domain (default: `com.projectx.hookprefs`)
//! - `HOOKPREFS_NOTIFICATION`: change notification name
//!   (default: `com.projectx.hookprefs.changed`)
//! - `HOOKPREFS_STORAGE_DIR`: shared storage directory
//!   (default: platform preference dir + `hookprefs`)

use crate::settings::SettingsOverrides;
use std::env;
use std::path::PathBuf;

pub const ENV_DOMAIN: &str = "HOOKPREFS_DOMAIN";
pub const ENV_NOTIFICATION: &str = "HOOKPREFS_NOTIFICATION";
pub const ENV_STORAGE_DIR: &str = "HOOKPREFS_STORAGE_DIR";

/// Load the settings named by environment variables. Unset ones stay `None`.
pub fn load_from_env() -> SettingsOverrides {
    SettingsOverrides {
        domain: env_string(ENV_DOMAIN),
        notification_name: env_string(ENV_NOTIFICATION),
        storage_dir: env_string(ENV_STORAGE_DIR).map(PathBuf::from),
    }
}

/// Unset and blank variables both read as absent.
fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
