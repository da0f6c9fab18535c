//! # Hook Preferences Store
//!
//! The entry point: resolves effective options, applies mutations and
//! keeps a per-store cache coherent with writes made elsewhere.
//!
//! ## Caching
//! The raw [`Configuration`] is loaded lazily on the first read and kept
//! until a change signal from another origin (or of unknown origin)
//! arrives, or until [`HookPrefsStore::invalidate`] is called.
//!
//! ## Mutations
//! Every mutation holds the cache lock, re-reads the storage entries it
//! rewrites, normalizes, writes whole entries through the gateway and
//! finally publishes exactly one change signal after the lock is released.
//! There is no atomicity across the global and per-consumer entries: a
//! failure between two writes leaves the first one applied, and the cache
//! is dropped so the next read sees what storage actually holds.

use crate::codec::ConfigDocument;
use crate::domain::FileDomain;
use crate::gateway::{DomainGateway, PersistenceGateway};
use crate::keys::HookKey;
use crate::notifier::{ChangeNotifier, ChangeSignal, FileSignalNotifier};
use crate::options::{HookOptions, PerConsumerOptions, RawOptions, normalize};
use crate::overlay::Configuration;
use crate::settings::{self, StoreSettings};
use errors::StoreError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct ConfigCache {
    state: Mutex<Option<Configuration>>,
}

impl ConfigCache {
    fn invalidate(&self) {
        *self.state.lock() = None;
    }
}

/// Layered hook preferences: defaults, global override, per-consumer overrides.
pub struct HookPrefsStore {
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn ChangeNotifier>,
    cache: Arc<ConfigCache>,
    origin: String,
}

impl HookPrefsStore {
    /// Builds a store and subscribes its cache to `notifier`.
    ///
    /// Fails only when the subscription cannot be established.
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self, StoreError> {
        let origin = Uuid::new_v4().to_string();
        let cache = Arc::new(ConfigCache::default());

        let weak: Weak<ConfigCache> = Arc::downgrade(&cache);
        let own_origin = origin.clone();
        notifier.subscribe(Arc::new(move |signal: &ChangeSignal| {
            // Signals without an origin are foreign.
            if signal.is_from(&own_origin) {
                return;
            }
            if let Some(cache) = weak.upgrade() {
                debug!("External change signal {:?}, dropping cache", signal.origin);
                cache.invalidate();
            }
        }))?;

        debug!(
            "Opened hook preferences store {} on {}",
            origin,
            notifier.notification_name()
        );

        Ok(Self {
            gateway,
            notifier,
            cache,
            origin,
        })
    }

    /// Opens the file-backed store described by `settings`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Builds the production wiring: a [`FileDomain`] at
    /// `<storage_dir>/<domain>.json` behind a [`DomainGateway`], and a
    /// [`FileSignalNotifier`] at `<storage_dir>/<notification_name>.signal`.
    /// Every process opening the same settings shares both files.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use hookprefs::{HookPrefsStore, StoreSettings};
    /// use std::path::PathBuf;
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let settings = StoreSettings {
    ///         storage_dir: PathBuf::from("/var/lib/hookprefs"),
    ///         ..StoreSettings::default()
    ///     };
    ///     let store = HookPrefsStore::open(&settings)?;
    ///     store.set_enabled("battery", true, Some("com.example.app"))?;
    ///     Ok(())
    /// }
    /// ```
    ///
    /// ## Errors
    /// `InvalidSettings` when validation fails, `NotifierUnavailable` when
    /// the storage directory cannot be watched.
    pub fn open(settings: &StoreSettings) -> Result<Self, StoreError> {
        settings::validate(settings).map_err(|e| StoreError::InvalidSettings {
            reason: e.to_string(),
        })?;

        let domain = Arc::new(FileDomain::new(&settings.storage_dir, &settings.domain));
        let gateway = Arc::new(DomainGateway::new(domain));
        let notifier = Arc::new(FileSignalNotifier::new(
            &settings.storage_dir,
            &settings.notification_name,
        ));

        info!(
            "Using domain {} in {:?}",
            settings.domain, settings.storage_dir
        );
        Self::new(gateway, notifier)
    }

    /// Token identifying this store in the change signals it publishes.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn notifier(&self) -> &dyn ChangeNotifier {
        self.notifier.as_ref()
    }

    /// Drops the cached configuration; the next read reloads from storage.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn with_config<T>(&self, read: impl FnOnce(&Configuration) -> T) -> Result<T, StoreError> {
        let mut state = self.cache.state.lock();
        let config = match state.take() {
            Some(config) => config,
            None => {
                debug!("Loading hook preferences from storage");
                Configuration::load(self.gateway.as_ref())?
            }
        };
        let result = read(&config);
        *state = Some(config);
        Ok(result)
    }

    fn mutate(
        &self,
        description: &str,
        apply: impl FnOnce(&dyn PersistenceGateway, &mut Configuration) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        {
            let mut state = self.cache.state.lock();
            *state = None;

            let mut config = Configuration::load(self.gateway.as_ref())?;
            apply(self.gateway.as_ref(), &mut config)?;
            *state = Some(config);
        }

        info!("{}", description);
        self.notifier.publish(&ChangeSignal::from_origin(&self.origin));
        Ok(())
    }

    /// A snapshot of the raw configuration.
    pub fn configuration(&self) -> Result<Configuration, StoreError> {
        self.with_config(Configuration::clone)
    }

    pub fn global_options(&self) -> Result<HookOptions, StoreError> {
        self.with_config(Configuration::global_options)
    }

    pub fn all_per_consumer_options(&self) -> Result<BTreeMap<String, HookOptions>, StoreError> {
        self.with_config(Configuration::all_per_consumer_options)
    }

    pub fn options_for(&self, consumer: &str) -> Result<HookOptions, StoreError> {
        self.with_config(|config| config.options_for(consumer))
    }

    /// Effective value of `key` for `consumer` (or globally). Unrecognized keys are off.
    pub fn is_enabled(&self, key: &str, consumer: Option<&str>) -> Result<bool, StoreError> {
        let Some(key) = HookKey::parse(key) else {
            return Ok(false);
        };
        self.with_config(|config| config.is_enabled(key, consumer))
    }

    /// Sets one toggle globally, or for `consumer` (creating its override).
    ///
    /// Unrecognized keys are accepted and vanish on normalization.
    pub fn set_enabled(
        &self,
        key: &str,
        enabled: bool,
        consumer: Option<&str>,
    ) -> Result<(), StoreError> {
        if HookKey::parse(key).is_none() {
            debug!("Setting unrecognized hook key {:?} has no effect", key);
        }

        let description = match consumer {
            Some(consumer) => format!("Set {} = {} for {}", key, enabled, consumer),
            None => format!("Set {} = {} globally", key, enabled),
        };

        self.mutate(&description, |gateway, config| match consumer {
            None => {
                let mut raw = config.global.clone();
                raw.insert(key.to_string(), Value::Bool(enabled));
                let normalized = normalize(&raw).to_raw();
                gateway.write_global(&normalized)?;
                config.global = normalized;
                Ok(())
            }
            Some(consumer) => {
                let mut raw = config
                    .per_consumer
                    .get(consumer)
                    .cloned()
                    .unwrap_or_default();
                raw.insert(key.to_string(), Value::Bool(enabled));

                let mut per_consumer = config.per_consumer.clone();
                per_consumer.insert(consumer.to_string(), normalize(&raw).to_raw());
                gateway.write_per_consumer(&per_consumer)?;
                config.per_consumer = per_consumer;
                Ok(())
            }
        })
    }

    /// Replaces the global dictionary with the normalized form of `options`.
    pub fn save_global_options(&self, options: &RawOptions) -> Result<(), StoreError> {
        self.mutate("Saved global options", |gateway, config| {
            let normalized = normalize(options).to_raw();
            gateway.write_global(&normalized)?;
            config.global = normalized;
            Ok(())
        })
    }

    /// Replaces every per-consumer override, each normalized independently.
    pub fn save_per_consumer_options(&self, options: &PerConsumerOptions) -> Result<(), StoreError> {
        let description = format!("Saved overrides for {} consumer(s)", options.len());
        self.mutate(&description, |gateway, config| {
            let normalized: PerConsumerOptions = options
                .iter()
                .map(|(consumer, raw)| (consumer.clone(), normalize(raw).to_raw()))
                .collect();
            gateway.write_per_consumer(&normalized)?;
            config.per_consumer = normalized;
            Ok(())
        })
    }

    pub fn reset_global_to_defaults(&self) -> Result<(), StoreError> {
        self.mutate("Reset global options to defaults", |gateway, config| {
            gateway.write_global(&RawOptions::new())?;
            config.global = RawOptions::new();
            Ok(())
        })
    }

    /// Removes the override for `consumer`; it falls back to the global options.
    pub fn reset_consumer_to_defaults(&self, consumer: &str) -> Result<(), StoreError> {
        let description = format!("Removed override for {}", consumer);
        self.mutate(&description, |gateway, config| {
            let mut per_consumer = config.per_consumer.clone();
            per_consumer.remove(consumer);
            gateway.write_per_consumer(&per_consumer)?;
            config.per_consumer = per_consumer;
            Ok(())
        })
    }

    pub fn reset_all_to_defaults(&self) -> Result<(), StoreError> {
        self.mutate("Reset all hook preferences to defaults", |gateway, config| {
            gateway.write_global(&RawOptions::new())?;
            config.global = RawOptions::new();
            gateway.write_per_consumer(&PerConsumerOptions::new())?;
            config.per_consumer = PerConsumerOptions::new();
            Ok(())
        })
    }

    /// The raw configuration as an export document.
    pub fn export_document(&self) -> Result<ConfigDocument, StoreError> {
        self.with_config(ConfigDocument::from_configuration)
    }

    /// Exports to a new JSON file in the system temp directory.
    pub fn export_to_temporary_json(&self) -> Result<PathBuf, StoreError> {
        self.export_to_dir(&std::env::temp_dir())
    }

    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let path = self.export_document()?.write_new_file_in(dir)?;
        info!("Exported hook preferences to {:?}", path);
        Ok(path)
    }

    /// Replaces the whole configuration with the normalized document.
    pub fn import_document(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        let imported = document.normalized();
        let description = format!(
            "Imported hook preferences ({} consumer override(s))",
            imported.per_consumer.len()
        );
        self.mutate(&description, |gateway, config| {
            gateway.write_global(&imported.global)?;
            config.global = imported.global;
            gateway.write_per_consumer(&imported.per_consumer)?;
            config.per_consumer = imported.per_consumer;
            Ok(())
        })
    }

    /// Parses and imports; nothing is written when parsing fails.
    pub fn import_from_json_str(&self, text: &str) -> Result<(), StoreError> {
        let document = ConfigDocument::parse(text)?;
        self.import_document(&document)
    }

    pub fn import_from_json_path(&self, path: &Path) -> Result<(), StoreError> {
        let document = ConfigDocument::read_from(path)?;
        self.import_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemoryDomain;
    use crate::gateway::KeyValueDomain;
    use crate::keys::default_options;
    use crate::notifier::LocalNotifier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> (Arc<MemoryDomain>, Arc<LocalNotifier>, HookPrefsStore) {
        let domain = Arc::new(MemoryDomain::new("test.domain"));
        let notifier = Arc::new(LocalNotifier::new("test.changed"));
        let store = HookPrefsStore::new(
            Arc::new(DomainGateway::new(domain.clone())),
            notifier.clone(),
        )
        .unwrap();
        (domain, notifier, store)
    }

    fn count_signals(notifier: &LocalNotifier) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        notifier
            .subscribe(Arc::new(move |_: &ChangeSignal| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        count
    }

    #[test]
    fn test_fresh_store_reads_defaults() {
        let (_, notifier, store) = store();
        assert_eq!(store.global_options().unwrap(), default_options());
        assert!(store.all_per_consumer_options().unwrap().is_empty());
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_each_mutation_publishes_once() {
        let (_, notifier, store) = store();
        let count = count_signals(&notifier);

        store.set_enabled("network", true, None).unwrap();
        store.set_enabled("battery", true, Some("a")).unwrap();
        store.reset_consumer_to_defaults("a").unwrap();
        store.reset_global_to_defaults().unwrap();
        store.reset_all_to_defaults().unwrap();
        store.save_global_options(&RawOptions::new()).unwrap();
        store
            .save_per_consumer_options(&PerConsumerOptions::new())
            .unwrap();
        store
            .import_from_json_str(r#"{ "GlobalOptions": {} }"#)
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_signals_carry_store_origin() {
        let (_, notifier, store) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        notifier
            .subscribe(Arc::new(move |signal: &ChangeSignal| {
                sink.lock().push(signal.clone());
            }))
            .unwrap();

        store.set_enabled("uuid", true, None).unwrap();
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_from(store.origin()));
    }

    #[test]
    fn test_failed_write_surfaces_and_skips_publish() {
        let (domain, notifier, store) = store();
        let count = count_signals(&notifier);

        domain.set_available(false);
        let err = store.set_enabled("network", true, None).unwrap_err();
        assert!(err.is_storage());
        assert!(store.global_options().unwrap_err().is_storage());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        domain.set_available(true);
        assert_eq!(store.global_options().unwrap(), default_options());
    }

    #[test]
    fn test_set_enabled_stores_normalized_dictionary() {
        let (domain, _, store) = store();
        store.set_enabled("network", true, None).unwrap();

        let stored = domain
            .get(crate::gateway::GLOBAL_OPTIONS_KEY)
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.as_object().unwrap().len(),
            crate::keys::key_count()
        );
        assert_eq!(stored["network"], Value::Bool(true));
    }

    #[test]
    fn test_is_enabled_lookup() {
        let (_, _, store) = store();
        store.set_enabled("wifi", true, None).unwrap();
        store.set_enabled("battery", true, Some("a")).unwrap();

        assert!(store.is_enabled("wifi", None).unwrap());
        assert!(store.is_enabled("wifi", Some("b")).unwrap());
        assert!(!store.is_enabled("wifi", Some("a")).unwrap());
        assert!(store.is_enabled("battery", Some("a")).unwrap());
        assert!(!store.is_enabled("legacyFlag", None).unwrap());
    }

    #[test]
    fn test_open_rejects_invalid_settings() {
        let settings = StoreSettings {
            domain: String::new(),
            ..Default::default()
        };
        let err = HookPrefsStore::open(&settings).err().unwrap();
        assert!(matches!(err, StoreError::InvalidSettings { .. }));
    }
}
