//! # Option Sets and Normalization
//!
//! Raw option sets come from storage or import documents and may be
//! partial, carry unknown keys or hold values that are not booleans.
//! [`normalize`] reconciles any raw set against the key registry and never
//! fails: malformed values fall back to the default and unknown keys are
//! dropped.

use crate::keys::{HookKey, all_keys};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A raw option set exactly as stored or imported.
pub type RawOptions = Map<String, Value>;

/// Raw per-consumer overrides keyed by consumer identifier.
pub type PerConsumerOptions = BTreeMap<String, RawOptions>;

/// A normalized option set: exactly one entry per registered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOptions {
    values: BTreeMap<HookKey, bool>,
}

impl HookOptions {
    pub(crate) fn from_fn(mut value_for: impl FnMut(HookKey) -> bool) -> Self {
        let values = all_keys()
            .into_iter()
            .map(|key| (key, value_for(key)))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: HookKey) -> bool {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_enabled())
    }

    /// Looks up a key by identifier; unrecognized identifiers are disabled.
    pub fn is_enabled(&self, key: &str) -> bool {
        HookKey::parse(key).is_some_and(|key| self.get(key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HookKey, bool)> + '_ {
        self.values.iter().map(|(key, enabled)| (*key, *enabled))
    }

    /// Keys that are switched on, in registry order.
    pub fn enabled_keys(&self) -> Vec<HookKey> {
        self.iter()
            .filter_map(|(key, enabled)| enabled.then_some(key))
            .collect()
    }

    /// The fully populated raw form, suitable for storage.
    pub fn to_raw(&self) -> RawOptions {
        self.iter()
            .map(|(key, enabled)| (key.as_str().to_string(), Value::Bool(enabled)))
            .collect()
    }
}

impl Serialize for HookOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(key, enabled)| (key.as_str(), enabled)))
    }
}

/// Reconciles a raw option set with the key registry.
pub fn normalize(raw: &RawOptions) -> HookOptions {
    for name in raw.keys().filter(|name| HookKey::parse(name).is_none()) {
        tracing::debug!("Dropping unrecognized hook key {:?}", name);
    }

    HookOptions::from_fn(|key| match raw.get(key.as_str()) {
        None => key.default_enabled(),
        Some(value) => coerce_bool(value).unwrap_or_else(|| {
            tracing::debug!(
                "Hook key {} holds non-boolean value {}, using default",
                key,
                value
            );
            key.default_enabled()
        }),
    })
}

/// Normalizes every consumer override independently against the registry.
pub fn normalize_per_consumer(raw: &PerConsumerOptions) -> BTreeMap<String, HookOptions> {
    raw.iter()
        .map(|(consumer, options)| (consumer.clone(), normalize(options)))
        .collect()
}

/// Booleans pass through; numbers are booleans by a non-zero test, the way
/// property-list numeric flags are stored. Everything else is malformed.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i != 0)
            .or_else(|| n.as_u64().map(|u| u != 0))
            .or_else(|| n.as_f64().map(|f| f != 0.0)),
        _ => None,
    }
}
