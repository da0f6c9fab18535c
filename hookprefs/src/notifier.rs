//! # Change Notification
//!
//! Broadcasts a payload-free "configuration changed" signal after every
//! successful write and delivers signals published by other stores,
//! including stores in other processes.
//!
//! A signal is only an invalidation hint: receivers re-read the store to
//! learn what changed. The optional origin token lets a store skip its own
//! signals; it is only set by transports that can attribute a signal to
//! its publisher reliably.

use errors::StoreError;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A "configuration changed" signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSignal {
    /// Token of the publishing store. `None` means "unknown origin" and
    /// must be treated as foreign.
    #[serde(default)]
    pub origin: Option<String>,
}

impl ChangeSignal {
    pub fn from_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
        }
    }

    /// Whether this signal was published by the store holding `origin`.
    pub fn is_from(&self, origin: &str) -> bool {
        self.origin.as_deref() == Some(origin)
    }
}

pub type ChangeHandler = Arc<dyn Fn(&ChangeSignal) + Send + Sync>;

/// Publish/subscribe transport for change signals.
pub trait ChangeNotifier: Send + Sync {
    fn notification_name(&self) -> &str;

    /// Fire-and-forget. Delivery failures are logged, never returned.
    fn publish(&self, signal: &ChangeSignal);

    /// Registers `handler` for every signal received from now on,
    /// including the subscriber's own.
    fn subscribe(&self, handler: ChangeHandler) -> Result<(), StoreError>;
}

/// In-process notifier: handlers run synchronously on the publishing thread.
pub struct LocalNotifier {
    name: String,
    handlers: RwLock<Vec<ChangeHandler>>,
}

impl LocalNotifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl ChangeNotifier for LocalNotifier {
    fn notification_name(&self) -> &str {
        &self.name
    }

    fn publish(&self, signal: &ChangeSignal) {
        // Snapshot so handlers may subscribe without deadlocking.
        let handlers = self.handlers.read().clone();
        debug!(
            "Delivering {} to {} local subscriber(s)",
            self.name,
            handlers.len()
        );
        for handler in handlers {
            handler(signal);
        }
    }

    fn subscribe(&self, handler: ChangeHandler) -> Result<(), StoreError> {
        self.handlers.write().push(handler);
        Ok(())
    }
}

/// Cross-process notifier built on a signal file.
///
/// Publishing rewrites `<signal_dir>/<name>.signal` with the publisher's
/// origin; subscribers watch the directory and fire on every create or
/// modify of that file.
///
/// Delivered signals never carry an origin. By the time a watcher runs,
/// the file may already hold a later publisher's token, so the token read
/// back cannot be attributed to the event. Subscribers therefore treat
/// every file signal as foreign. The recorded origin is kept for
/// [`FileSignalNotifier::last_publisher`].
pub struct FileSignalNotifier {
    name: String,
    signal_dir: PathBuf,
    signal_path: PathBuf,
    watchers: Mutex<Vec<RecommendedWatcher>>,
}

impl FileSignalNotifier {
    pub fn new(signal_dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let signal_path = signal_dir.join(format!("{}.signal", name));
        Self {
            name,
            signal_dir: signal_dir.to_path_buf(),
            signal_path,
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn signal_path(&self) -> &Path {
        &self.signal_path
    }

    /// Origin recorded by the most recent publish, if the signal file exists.
    pub fn last_publisher(&self) -> Option<String> {
        read_signal(&self.signal_path).origin
    }

    fn write_signal(&self, signal: &ChangeSignal) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.signal_dir)?;
        let bytes = serde_json::to_vec(signal).map_err(std::io::Error::other)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.signal_dir)?;
        temp.write_all(&bytes)?;
        temp.persist(&self.signal_path)
            .map_err(|e| e.error)?;
        Ok(())
    }
}

fn read_signal(path: &Path) -> ChangeSignal {
    std::fs::read(path)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

impl ChangeNotifier for FileSignalNotifier {
    fn notification_name(&self) -> &str {
        &self.name
    }

    fn publish(&self, signal: &ChangeSignal) {
        match self.write_signal(signal) {
            Ok(()) => debug!("Published {} via {:?}", self.name, self.signal_path),
            Err(e) => warn!("Failed to publish {}: {}", self.name, e),
        }
    }

    fn subscribe(&self, handler: ChangeHandler) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.signal_dir).map_err(|e| {
            StoreError::NotifierUnavailable {
                reason: format!("{}: {}", self.signal_dir.display(), e),
            }
        })?;

        let signal_name = self.signal_path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    let touches_signal = event
                        .paths
                        .iter()
                        .any(|path| path.file_name().map(|n| n.to_os_string()) == signal_name);
                    if touches_signal {
                        handler(&ChangeSignal::default());
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(|e| {
            let reason = format!("Failed to create file watcher: {}", e);
            error!("{}", reason);
            StoreError::NotifierUnavailable { reason }
        })?;

        watcher
            .watch(&self.signal_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                let reason = format!("Failed to watch {:?}: {}", self.signal_dir, e);
                error!("{}", reason);
                StoreError::NotifierUnavailable { reason }
            })?;

        info!("Watching {} at {:?}", self.name, self.signal_path);
        self.watchers.lock().push(watcher);
        Ok(())
    }
}

/// Bridges a notifier subscription into an async channel.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Lets async code await configuration changes instead of registering a
/// synchronous handler. Every signal the notifier delivers from now on is
/// forwarded to the returned receiver.
///
/// ## Usage
/// ```rust,no_run
/// use hookprefs::{HookPrefsStore, StoreSettings, watch_changes};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = HookPrefsStore::open(&StoreSettings::default())?;
///     let mut rx = watch_changes(store.notifier(), 16)?;
///
///     while rx.recv().await.is_some() {
///         println!("network: {}", store.is_enabled("network", None)?);
///     }
///     Ok(())
/// }
/// ```
///
/// ## Backpressure
/// Sends never block the notifying thread. When the channel is full the
/// signal is dropped; a queued signal already means "re-read".
pub fn watch_changes(
    notifier: &dyn ChangeNotifier,
    capacity: usize,
) -> Result<tokio::sync::mpsc::Receiver<ChangeSignal>, StoreError> {
    let (tx, rx) = tokio::sync::mpsc::channel(capacity.max(1));
    let name = notifier.notification_name().to_string();

    notifier.subscribe(Arc::new(move |signal: &ChangeSignal| {
        use tokio::sync::mpsc::error::TrySendError;

        match tx.try_send(signal.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Change stream for {} is full, dropping signal", name);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Change stream for {} closed", name);
            }
        }
    }))?;

    Ok(rx)
}
