//! Ephemeral key-value tier
//!
//! Every entry lives inside one value under a single physical key,
//! serialized as a JSON blob. Writes rewrite the whole blob, which keeps
//! the backend contract tiny: read a string, write a string. That makes
//! the tier cheap to back by anything string-shaped and always available
//! offline, at the cost of per-write serialization of the full map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::StorageTier;
use crate::config::DEFAULT_STORAGE_KEY;
use crate::entry::{ShareEntry, ShareId};
use crate::error::{Error, Result};

/// Synchronous string-keyed store behind the ephemeral tier.
///
/// `write` may fail on quota exhaustion; reading a missing key is `None`.
pub trait KeyValueBackend: Send + Sync {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory backend, primarily for tests and single-process use
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed backend storing one file per key under a directory.
///
/// An optional byte quota bounds the size of any single value; writes over
/// the quota fail without touching the previously stored value. Accepted
/// writes are staged in a sibling file and renamed into place, so a stored
/// value is either the old one or the new one, never a partial write.
#[derive(Debug)]
pub struct FileBackend {
    directory: PathBuf,
    max_bytes: Option<usize>,
}

impl FileBackend {
    /// Create a backend rooted at `directory` with no quota
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            max_bytes: None,
        }
    }

    /// Create a backend rooted at `directory` with a per-value byte quota
    pub fn with_quota(directory: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            directory: directory.into(),
            max_bytes: Some(max_bytes),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(safe_name(key))
    }

    fn staging_path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.tmp", safe_name(key)))
    }
}

fn safe_name(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if let Some(max_bytes) = self.max_bytes {
            if value.len() > max_bytes {
                return Err(Error::quota(format!(
                    "value of {} bytes exceeds quota of {} bytes",
                    value.len(),
                    max_bytes
                )));
            }
        }

        fs::create_dir_all(&self.directory)?;

        // Stage next to the target and rename over it; an interrupted
        // write never touches the committed value
        let staging = self.staging_path_for(key);
        fs::write(&staging, value)?;
        fs::rename(&staging, self.path_for(key))?;
        Ok(())
    }
}

/// Storage tier keeping all entries as one serialized blob in a
/// key-value backend
pub struct EphemeralTier {
    backend: Arc<dyn KeyValueBackend>,
    storage_key: String,
}

impl EphemeralTier {
    /// Create a tier over the given backend and physical key
    pub fn new(backend: Arc<dyn KeyValueBackend>, storage_key: impl Into<String>) -> Self {
        Self {
            backend,
            storage_key: storage_key.into(),
        }
    }

    /// Create a tier over a fresh in-memory backend and the default key
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), DEFAULT_STORAGE_KEY)
    }

    fn load_map(&self) -> Result<HashMap<ShareId, ShareEntry>> {
        match self.backend.read(&self.storage_key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(HashMap::new()),
        }
    }

    fn store_map(&self, map: &HashMap<ShareId, ShareEntry>) -> Result<()> {
        let raw = serde_json::to_string(map)?;
        self.backend.write(&self.storage_key, &raw)
    }
}

#[async_trait]
impl StorageTier for EphemeralTier {
    fn name(&self) -> &str {
        "ephemeral"
    }

    async fn get(&self, id: &str) -> Result<Option<ShareEntry>> {
        Ok(self.load_map()?.remove(id))
    }

    async fn set(&self, entry: &ShareEntry) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(entry.id.clone(), entry.clone());
        self.store_map(&map)?;
        debug!(id = %entry.id, entries = map.len(), "Ephemeral blob rewritten");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut map = self.load_map()?;
        if map.remove(id).is_some() {
            self.store_map(&map)?;
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<HashMap<ShareId, ShareEntry>> {
        self.load_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Backend whose writes fail once the value crosses a size limit
    struct QuotaBackend {
        inner: MemoryBackend,
        max_bytes: usize,
    }

    impl KeyValueBackend for QuotaBackend {
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            if value.len() > self.max_bytes {
                return Err(Error::quota("simulated quota exhaustion"));
            }
            self.inner.write(key, value)
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let tier = EphemeralTier::in_memory();
        let entry = ShareEntry::new("id-1", "graph TD");

        assert!(tier.get("id-1").await.unwrap().is_none());

        tier.set(&entry).await.unwrap();
        assert_eq!(tier.get("id-1").await.unwrap().unwrap(), entry);
        assert!(tier.has("id-1").await.unwrap());

        tier.delete("id-1").await.unwrap();
        assert!(tier.get("id-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_ok() {
        let tier = EphemeralTier::in_memory();
        assert!(tier.delete("never-existed").await.is_ok());
    }

    #[tokio::test]
    async fn test_entries_share_one_physical_key() {
        let backend = Arc::new(MemoryBackend::new());
        let tier = EphemeralTier::new(backend.clone(), "test.blob");

        tier.set(&ShareEntry::new("a", "1")).await.unwrap();
        tier.set(&ShareEntry::new("b", "2")).await.unwrap();

        // Both entries live in the single blob under the configured key
        let raw = backend.read("test.blob").unwrap().unwrap();
        let blob: HashMap<ShareId, ShareEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(blob.len(), 2);

        let all = tier.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"].content, "1");
        assert_eq!(all["b"].content, "2");
    }

    #[tokio::test]
    async fn test_quota_failure_preserves_existing_entries() {
        let backend = Arc::new(QuotaBackend {
            inner: MemoryBackend::new(),
            max_bytes: 256,
        });
        let tier = EphemeralTier::new(backend, "test.blob");

        let small = ShareEntry::new("small", "ok");
        tier.set(&small).await.unwrap();

        let big = ShareEntry::new("big", "x".repeat(1024));
        let err = tier.set(&big).await.unwrap_err();
        assert!(err.is_quota_error());

        // The failed write must not disturb what was already stored
        assert_eq!(tier.get("small").await.unwrap().unwrap(), small);
        assert!(tier.get("big").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backend_persists_across_instances() {
        let dir = tempdir().unwrap();
        let entry = ShareEntry::new("id-1", "flowchart LR");

        {
            let tier = EphemeralTier::new(Arc::new(FileBackend::new(dir.path())), "blob");
            tier.set(&entry).await.unwrap();
        }

        let tier = EphemeralTier::new(Arc::new(FileBackend::new(dir.path())), "blob");
        assert_eq!(tier.get("id-1").await.unwrap().unwrap(), entry);
    }

    #[tokio::test]
    async fn test_file_backend_quota() {
        let dir = tempdir().unwrap();
        let tier = EphemeralTier::new(
            Arc::new(FileBackend::with_quota(dir.path(), 128)),
            "blob",
        );

        let err = tier
            .set(&ShareEntry::new("big", "y".repeat(512)))
            .await
            .unwrap_err();
        assert!(err.is_quota_error());
    }

    #[tokio::test]
    async fn test_interrupted_write_keeps_committed_entries() {
        let dir = tempdir().unwrap();
        let tier = EphemeralTier::new(Arc::new(FileBackend::new(dir.path())), "blob");
        let entry = ShareEntry::new("id-1", "graph TD");
        tier.set(&entry).await.unwrap();

        // A writer killed before the rename leaves a partial staging
        // file behind, never a partial blob
        fs::write(dir.path().join("blob.tmp"), "{\"id-2\":{\"id\"").unwrap();

        assert_eq!(tier.get("id-1").await.unwrap().unwrap(), entry);
        assert_eq!(tier.get_all().await.unwrap().len(), 1);

        // The next write goes through and replaces the stale staging file
        tier.set(&ShareEntry::new("id-2", "pie")).await.unwrap();
        assert_eq!(tier.get_all().await.unwrap().len(), 2);
    }

    #[test]
    fn test_write_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.write("blob", "first").unwrap();
        backend.write("blob", "second").unwrap();

        assert_eq!(backend.read("blob").unwrap().as_deref(), Some("second"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_backend_sanitizes_keys() {
        let backend = FileBackend::new("/tmp/amber");
        let path = backend.path_for("../escape/attempt");

        // Separators are rewritten, so the file stays directly in the root
        assert_eq!(path.parent(), Some(std::path::Path::new("/tmp/amber")));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(".._escape_attempt")
        );
    }
}
