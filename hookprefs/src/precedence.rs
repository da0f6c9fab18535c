//! # Settings Precedence
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Settings file
//! 4. Default values (lowest priority)
//!
//! The settings file is a complete [`StoreSettings`] (missing fields take
//! their defaults). Environment and CLI are [`SettingsOverrides`]: a field
//! they name always wins, whatever its value.

use crate::settings::{SettingsOverrides, StoreSettings};

/// Merge settings sources with precedence.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Resolves the settings a store opens with from every source, highest
/// priority last: defaults, settings file, environment, command line.
///
/// ## Usage
/// ```rust,no_run
/// use hookprefs::{SettingsOverrides, load_from_env, load_from_file, merge_settings};
/// use std::path::{Path, PathBuf};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("hookprefs.toml"))?;
///     let from_cli = SettingsOverrides {
///         storage_dir: Some(PathBuf::from("/tmp/hookprefs")),
///         ..Default::default()
///     };
///
///     let _settings = merge_settings(Some(from_file), load_from_env(), from_cli);
///     Ok(())
/// }
/// ```
///
/// ## Logging
/// Each source that changes a field logs the new values at `info`.
pub fn merge_settings(
    file_settings: Option<StoreSettings>,
    env_overrides: SettingsOverrides,
    cli_overrides: SettingsOverrides,
) -> StoreSettings {
    let mut settings = match file_settings {
        Some(file) => {
            if file != StoreSettings::default() {
                tracing::info!("Settings from file: {:?}", file);
            }
            file
        }
        None => StoreSettings::default(),
    };

    settings = apply_with_logging(settings, env_overrides, "env");
    apply_with_logging(settings, cli_overrides, "cli")
}

fn apply_with_logging(
    mut base: StoreSettings,
    overrides: SettingsOverrides,
    source_name: &str,
) -> StoreSettings {
    let mut changes = Vec::new();

    if let Some(domain) = overrides.domain {
        if domain != base.domain {
            changes.push(format!("domain = {}", domain));
        }
        base.domain = domain;
    }
    if let Some(notification_name) = overrides.notification_name {
        if notification_name != base.notification_name {
            changes.push(format!("notification_name = {}", notification_name));
        }
        base.notification_name = notification_name;
    }
    if let Some(storage_dir) = overrides.storage_dir {
        if storage_dir != base.storage_dir {
            changes.push(format!("storage_dir = {}", storage_dir.display()));
        }
        base.storage_dir = storage_dir;
    }

    if !changes.is_empty() {
        tracing::info!("Settings from {}: {:?}", source_name, changes);
    }

    base
}
