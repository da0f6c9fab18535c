//! # Overlay Resolution
//!
//! Effective options are never stored; they are derived from the raw
//! configuration on every read.
//!
//! # Precedence
//! 1. Per-consumer override, normalized against registry defaults
//! 2. Global override, normalized against registry defaults
//! 3. Registry defaults
//!
//! A consumer override does not inherit keys from the global override: a
//! consumer that has an override gets exactly that override filled from
//! defaults.

use crate::gateway::PersistenceGateway;
use crate::keys::HookKey;
use crate::options::{
    HookOptions, PerConsumerOptions, RawOptions, normalize, normalize_per_consumer,
};
use errors::StoreError;
use std::collections::BTreeMap;

/// The aggregate root: raw global options plus raw per-consumer overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub global: RawOptions,
    pub per_consumer: PerConsumerOptions,
}

impl Configuration {
    pub fn load(gateway: &dyn PersistenceGateway) -> Result<Self, StoreError> {
        Ok(Self {
            global: gateway.read_global()?,
            per_consumer: gateway.read_per_consumer()?,
        })
    }

    pub fn global_options(&self) -> HookOptions {
        normalize(&self.global)
    }

    pub fn all_per_consumer_options(&self) -> BTreeMap<String, HookOptions> {
        normalize_per_consumer(&self.per_consumer)
    }

    pub fn has_override(&self, consumer: &str) -> bool {
        self.per_consumer.contains_key(consumer)
    }

    /// Effective options for `consumer`, or the global options when it has no override.
    pub fn options_for(&self, consumer: &str) -> HookOptions {
        match self.per_consumer.get(consumer) {
            Some(raw) => normalize(raw),
            None => self.global_options(),
        }
    }

    /// Effective value of one key. Without a consumer the global layer applies.
    pub fn is_enabled(&self, key: HookKey, consumer: Option<&str>) -> bool {
        match consumer {
            Some(consumer) => self.options_for(consumer).get(key),
            None => self.global_options().get(key),
        }
    }
}
