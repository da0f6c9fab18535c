//! # Hook Key Registry
//!
//! The canonical catalog of hook toggles and their built-in defaults.
//!
//! Every other module asks this registry for the key list; nothing else
//! hard-codes key names.

use crate::options::HookOptions;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Identifier of one hook toggle.
///
/// Declaration order is the registry order: `Ord`, iteration and every
/// normalized option set follow it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum HookKey {
    Battery,
    BootTime,
    Canvas,
    DeviceModel,
    DeviceSpec,
    IosVersion,
    Network,
    Pasteboard,
    Storage,
    Core,
    Uuid,
    UserDefaults,
    Wifi,
}

impl HookKey {
    /// Built-in default for this toggle. Hooks are opt-in.
    pub fn default_enabled(self) -> bool {
        match self {
            Self::Battery
            | Self::BootTime
            | Self::Canvas
            | Self::DeviceModel
            | Self::DeviceSpec
            | Self::IosVersion
            | Self::Network
            | Self::Pasteboard
            | Self::Storage
            | Self::Core
            | Self::Uuid
            | Self::UserDefaults
            | Self::Wifi => false,
        }
    }

    /// Looks up a key by its stable identifier. Unknown identifiers yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// All registered keys in registry order.
pub fn all_keys() -> Vec<HookKey> {
    HookKey::iter().collect()
}

/// Number of registered keys; every normalized option set has exactly this many entries.
pub const fn key_count() -> usize {
    HookKey::COUNT
}

/// The normalized option set holding every key's built-in default.
pub fn default_options() -> HookOptions {
    HookOptions::from_fn(HookKey::default_enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_is_stable_and_complete() {
        let keys = all_keys();
        assert_eq!(keys.len(), key_count());
        assert_eq!(keys.first(), Some(&HookKey::Battery));
        assert_eq!(keys.last(), Some(&HookKey::Wifi));
        assert_eq!(keys, all_keys());
    }

    #[test]
    fn test_identifiers_round_trip_through_parse() {
        for key in all_keys() {
            assert_eq!(key.to_string(), key.as_str());
            assert_eq!(HookKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_identifier_spelling() {
        assert_eq!(HookKey::IosVersion.as_str(), "iosVersion");
        assert_eq!(HookKey::UserDefaults.to_string(), "userDefaults");
        assert_eq!(HookKey::parse("legacyFlag"), None);
        assert_eq!(HookKey::parse("Battery"), None);
    }

    #[test]
    fn test_serde_uses_identifiers() {
        let json = serde_json::to_string(&HookKey::DeviceModel).unwrap();
        assert_eq!(json, "\"deviceModel\"");
        let key: HookKey = serde_json::from_str("\"bootTime\"").unwrap();
        assert_eq!(key, HookKey::BootTime);
    }

    #[test]
    fn test_default_options_cover_registry() {
        let defaults = default_options();
        assert_eq!(defaults.len(), key_count());
        for key in all_keys() {
            assert_eq!(defaults.get(key), key.default_enabled());
        }
    }
}
