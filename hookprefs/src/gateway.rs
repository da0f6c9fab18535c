//! # Persistence Gateway
//!
//! Durable storage of the raw global and per-consumer option dictionaries.
//!
//! The gateway sits on top of a named key-value domain. Two entries are
//! used: [`GLOBAL_OPTIONS_KEY`] and [`PER_APP_OPTIONS_KEY`]. Every write
//! replaces the whole entry; callers that change one toggle do their own
//! read-modify-write.

use crate::options::{PerConsumerOptions, RawOptions};
use errors::StoreError;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const GLOBAL_OPTIONS_KEY: &str = "GlobalOptions";
pub const PER_APP_OPTIONS_KEY: &str = "PerAppOptions";

/// A named, process-shared key-value domain.
pub trait KeyValueDomain: Send + Sync {
    /// Domain identifier, e.g. `com.projectx.hookprefs`.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Flushes pending writes to durable storage.
    fn synchronize(&self) -> Result<(), StoreError>;
}

/// Storage of the raw configuration dictionaries.
pub trait PersistenceGateway: Send + Sync {
    fn read_global(&self) -> Result<RawOptions, StoreError>;

    fn write_global(&self, options: &RawOptions) -> Result<(), StoreError>;

    fn read_per_consumer(&self) -> Result<PerConsumerOptions, StoreError>;

    fn write_per_consumer(&self, options: &PerConsumerOptions) -> Result<(), StoreError>;
}

/// [`PersistenceGateway`] backed by any [`KeyValueDomain`].
pub struct DomainGateway {
    domain: Arc<dyn KeyValueDomain>,
}

impl DomainGateway {
    pub fn new(domain: Arc<dyn KeyValueDomain>) -> Self {
        Self { domain }
    }

    pub fn domain_name(&self) -> &str {
        self.domain.name()
    }

    fn write(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.domain.set(key, value)?;
        self.domain.synchronize()
    }
}

impl PersistenceGateway for DomainGateway {
    fn read_global(&self) -> Result<RawOptions, StoreError> {
        match self.domain.get(GLOBAL_OPTIONS_KEY)? {
            None => Ok(RawOptions::new()),
            Some(Value::Object(map)) => Ok(map),
            Some(other) => {
                warn!(
                    "Ignoring {} in domain {}: expected an object, found {}",
                    GLOBAL_OPTIONS_KEY,
                    self.domain.name(),
                    kind_of(&other)
                );
                Ok(RawOptions::new())
            }
        }
    }

    fn write_global(&self, options: &RawOptions) -> Result<(), StoreError> {
        self.write(GLOBAL_OPTIONS_KEY, Value::Object(options.clone()))
    }

    fn read_per_consumer(&self) -> Result<PerConsumerOptions, StoreError> {
        let entries = match self.domain.get(PER_APP_OPTIONS_KEY)? {
            None => return Ok(PerConsumerOptions::new()),
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(
                    "Ignoring {} in domain {}: expected an object, found {}",
                    PER_APP_OPTIONS_KEY,
                    self.domain.name(),
                    kind_of(&other)
                );
                return Ok(PerConsumerOptions::new());
            }
        };

        let mut per_consumer = PerConsumerOptions::new();
        for (consumer, options) in entries {
            match options {
                Value::Object(map) => {
                    per_consumer.insert(consumer, map);
                }
                other => warn!(
                    "Skipping override for {}: expected an object, found {}",
                    consumer,
                    kind_of(&other)
                ),
            }
        }
        Ok(per_consumer)
    }

    fn write_per_consumer(&self, options: &PerConsumerOptions) -> Result<(), StoreError> {
        let value = options
            .iter()
            .map(|(consumer, map)| (consumer.clone(), Value::Object(map.clone())))
            .collect();
        self.write(PER_APP_OPTIONS_KEY, Value::Object(value))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
