//! # Settings File Loading
//!
//! Loads [`StoreSettings`] from TOML or YAML files, picking the format from
//! the file extension.

use crate::settings::StoreSettings;
use std::path::Path;

/// Settings file loading error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Settings file has no extension")]
    NoExtension,

    #[error("Unsupported settings file format: {0}")]
    UnsupportedFormat(String),
}

pub fn load_from_toml(path: &Path) -> Result<StoreSettings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    toml::from_str(&contents).map_err(|e| SettingsFileError::TomlParse(e.to_string()))
}

pub fn load_from_yaml(path: &Path) -> Result<StoreSettings, SettingsFileError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| SettingsFileError::FileNotFound(path.display().to_string()))?;

    serde_yaml::from_str(&contents).map_err(|e| SettingsFileError::YamlParse(e.to_string()))
}

/// Load settings from `.toml`, `.yaml` or `.yml`.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Reads a settings file, choosing the parser from the extension
/// (case-insensitive). Fields the file leaves out take their defaults.
///
/// ## Usage
/// ```rust,no_run
/// use hookprefs::load_from_file;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = load_from_file(Path::new("/etc/hookprefs.yaml"))?;
///     println!("storage: {}", settings.storage_dir.display());
///     Ok(())
/// }
/// ```
///
/// ## Errors
/// `NoExtension` or `UnsupportedFormat` before any I/O; `FileNotFound`,
/// `TomlParse` or `YamlParse` afterwards.
pub fn load_from_file(path: &Path) -> Result<StoreSettings, SettingsFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(SettingsFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(SettingsFileError::UnsupportedFormat(other.to_string())),
    }
}
