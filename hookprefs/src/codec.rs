//! # Import/Export Codec
//!
//! The whole configuration as one JSON document:
//!
//! ```json
//! {
//!   "GlobalOptions": { "network": true },
//!   "PerAppOptions": { "com.example.app": { "battery": true } }
//! }
//! ```
//!
//! Unknown keys inside either object survive parsing and are dropped by
//! normalization on import.

use crate::gateway::{GLOBAL_OPTIONS_KEY, PER_APP_OPTIONS_KEY};
use crate::options::{PerConsumerOptions, RawOptions, normalize};
use crate::overlay::Configuration;
use errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

const EXPORT_PREFIX: &str = "hookprefs-export-";

/// Serialized form of a [`Configuration`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "GlobalOptions", default)]
    pub global_options: RawOptions,

    #[serde(rename = "PerAppOptions", default)]
    pub per_app_options: PerConsumerOptions,
}

impl ConfigDocument {
    pub fn from_configuration(config: &Configuration) -> Self {
        Self {
            global_options: config.global.clone(),
            per_app_options: config.per_consumer.clone(),
        }
    }

    /// Parses an import document.
    ///
    /// The root must be a JSON object holding at least one of the two
    /// top-level fields; each field present must be an object and every
    /// consumer entry must be an object. A missing field reads as empty.
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_str(text).map_err(StoreError::parse)?;

        let Value::Object(root) = &value else {
            return Err(StoreError::parse("document root is not a JSON object"));
        };
        if !root.contains_key(GLOBAL_OPTIONS_KEY) && !root.contains_key(PER_APP_OPTIONS_KEY) {
            return Err(StoreError::parse(format!(
                "document has neither {} nor {}",
                GLOBAL_OPTIONS_KEY, PER_APP_OPTIONS_KEY
            )));
        }

        serde_json::from_value(value).map_err(StoreError::parse)
    }

    pub fn read_from(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(StoreError::parse)
    }

    /// The configuration to persist on import: every dictionary normalized.
    pub fn normalized(&self) -> Configuration {
        Configuration {
            global: normalize(&self.global_options).to_raw(),
            per_consumer: self
                .per_app_options
                .iter()
                .map(|(consumer, options)| (consumer.clone(), normalize(options).to_raw()))
                .collect(),
        }
    }

    /// Writes the document to a new `hookprefs-export-*.json` file in `dir`
    /// and returns its path. The file is kept after the call.
    pub fn write_new_file_in(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let json = self.to_json_pretty()?;

        let mut file = tempfile::Builder::new()
            .prefix(EXPORT_PREFIX)
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(dir, e))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| StoreError::io(file.path(), e))?;

        let (_, path) = file.keep().map_err(|e| StoreError::io(dir, e))?;
        Ok(path)
    }
}
