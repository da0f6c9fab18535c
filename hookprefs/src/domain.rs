//! # Key-Value Domain Adapters
//!
//! - [`MemoryDomain`]: process-local map, with fault injection for tests
//! - [`FileDomain`]: one JSON document per domain inside a storage
//!   directory, shared by every process pointed at that directory

use crate::gateway::KeyValueDomain;
use errors::StoreError;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-memory domain.
pub struct MemoryDomain {
    name: String,
    entries: RwLock<BTreeMap<String, Value>>,
    available: AtomicBool,
}

impl MemoryDomain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// When unavailable, every call fails with `StorageUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::storage("memory", "domain marked unavailable"))
        }
    }
}

impl KeyValueDomain for MemoryDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn synchronize(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

/// File-backed domain stored at `<storage_dir>/<name>.json`.
///
/// Each `set`/`remove` rewrites the document through a temporary file in
/// the same directory followed by a rename, so readers in other processes
/// never observe a half-written document.
pub struct FileDomain {
    name: String,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDomain {
    pub fn new(storage_dir: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = storage_dir.join(format!("{}.json", name));
        Self {
            name,
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StoreError::storage(
                    "file",
                    format!("{}: {}", self.path.display(), e),
                ));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::storage(
                "file",
                format!("{}: document is not a JSON object", self.path.display()),
            )),
            Err(e) => Err(StoreError::storage(
                "file",
                format!("{}: {}", self.path.display(), e),
            )),
        }
    }

    fn store(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| StoreError::storage("file", "storage path has no parent directory"))?;
        std::fs::create_dir_all(dir)
            .map_err(|e| StoreError::storage("file", format!("{}: {}", dir.display(), e)))?;

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::storage("file", e))?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| StoreError::storage("file", format!("{}: {}", dir.display(), e)))?;
        temp.write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| StoreError::storage("file", e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::storage("file", format!("{}: {}", self.path.display(), e)))?;

        debug!("Wrote domain {} to {:?}", self.name, self.path);
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut document = self.load()?;
        apply(&mut document);
        self.store(&document)
    }
}

impl KeyValueDomain for FileDomain {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(|document| {
            document.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|document| {
            document.remove(key);
        })
    }

    fn synchronize(&self) -> Result<(), StoreError> {
        // Writes are synced and renamed into place before `set` returns.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_domain_get_set_remove() {
        let domain = MemoryDomain::new("mem");
        assert_eq!(domain.get("k").unwrap(), None);
        domain.set("k", json!({ "a": true })).unwrap();
        assert_eq!(domain.get("k").unwrap(), Some(json!({ "a": true })));
        domain.remove("k").unwrap();
        assert_eq!(domain.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_domain_unavailable() {
        let domain = MemoryDomain::new("mem");
        domain.set_available(false);
        assert!(domain.get("k").unwrap_err().is_storage());
        assert!(domain.set("k", json!(1)).unwrap_err().is_storage());
        assert!(domain.synchronize().unwrap_err().is_storage());
        domain.set_available(true);
        assert!(domain.get("k").is_ok());
    }

    #[test]
    fn test_file_domain_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let domain = FileDomain::new(dir.path(), "com.example.prefs");
        assert_eq!(domain.get("GlobalOptions").unwrap(), None);
        assert_eq!(
            domain.path(),
            dir.path().join("com.example.prefs.json").as_path()
        );
    }

    #[test]
    fn test_file_domain_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileDomain::new(dir.path(), "shared");
        writer.set("GlobalOptions", json!({ "network": true })).unwrap();
        writer.set("PerAppOptions", json!({})).unwrap();

        let reader = FileDomain::new(dir.path(), "shared");
        assert_eq!(
            reader.get("GlobalOptions").unwrap(),
            Some(json!({ "network": true }))
        );
        assert_eq!(reader.get("PerAppOptions").unwrap(), Some(json!({})));

        writer.remove("GlobalOptions").unwrap();
        assert_eq!(reader.get("GlobalOptions").unwrap(), None);
        assert_eq!(reader.get("PerAppOptions").unwrap(), Some(json!({})));
    }

    #[test]
    fn test_file_domain_creates_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let domain = FileDomain::new(&nested, "nested");
        domain.set("k", json!(true)).unwrap();
        assert!(nested.join("nested.json").exists());
    }

    #[test]
    fn test_file_domain_corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let domain = FileDomain::new(dir.path(), "corrupt");
        std::fs::write(domain.path(), "{ not json").unwrap();
        assert!(domain.get("k").unwrap_err().is_storage());

        std::fs::write(domain.path(), "[1, 2]").unwrap();
        assert!(domain.get("k").unwrap_err().is_storage());
    }
}
