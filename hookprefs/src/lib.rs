//! # Hook Preferences
//!
//! Layered storage for a fixed set of boolean hook toggles.
//!
//! This crate provides:
//! - The key registry and built-in defaults
//! - Normalization of arbitrary option dictionaries against the registry
//! - Overlay resolution (defaults, global override, per-consumer override)
//! - Persistence through an injected key-value domain
//! - Change notification shared across processes
//! - JSON import and export of the whole configuration
//!
//! ```rust,no_run
//! use hookprefs::{HookPrefsStore, StoreSettings};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = HookPrefsStore::open(&StoreSettings::default())?;
//!     store.set_enabled("network", true, None)?;
//!     let options = store.options_for("com.example.app")?;
//!     println!("network hook: {}", options.is_enabled("network"));
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod domain;
pub mod file_loader;
pub mod gateway;
pub mod keys;
pub mod loader;
pub mod notifier;
pub mod options;
pub mod overlay;
pub mod precedence;
pub mod settings;
pub mod store;

pub use codec::ConfigDocument;
pub use domain::{FileDomain, MemoryDomain};
pub use errors::StoreError;
pub use file_loader::{SettingsFileError, load_from_file};
pub use gateway::{DomainGateway, KeyValueDomain, PersistenceGateway};
pub use keys::{HookKey, all_keys, default_options};
pub use loader::load_from_env;
pub use notifier::{
    ChangeHandler, ChangeNotifier, ChangeSignal, FileSignalNotifier, LocalNotifier, watch_changes,
};
pub use options::{HookOptions, PerConsumerOptions, RawOptions, normalize};
pub use overlay::Configuration;
pub use precedence::merge_settings;
pub use settings::{SettingsOverrides, StoreSettings};
pub use store::HookPrefsStore;
