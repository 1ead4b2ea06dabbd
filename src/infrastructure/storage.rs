//! Object storage backends for media bytes.
//!
//! The variant in use is picked once at start-up from `Config::storage`.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::{MediaStorage, StorageError};
use crate::infrastructure::config::StorageBackend;

/// Build the configured storage variant.
pub fn build_storage(backend: &StorageBackend) -> Arc<dyn MediaStorage> {
    match backend {
        StorageBackend::Filesystem { root } => Arc::new(FilesystemMediaStorage::new(root)),
        StorageBackend::Memory => Arc::new(InMemoryMediaStorage::new()),
    }
}

/// Stores each object as a flat file under `root`; the storage path is the key.
pub struct FilesystemMediaStorage {
    root: PathBuf,
}

impl FilesystemMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for FilesystemMediaStorage {
    async fn store(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let full_path = self.full_path(name)?;
        debug!(key = %name, content_type, size = bytes.len(), "media_storage: write");

        let io_err = |source| StorageError::Io {
            path: full_path.display().to_string(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("part");
        let mut file = fs::File::create(&temp_path).await.map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);
        fs::rename(&temp_path, &full_path).await.map_err(io_err)?;

        Ok(name.to_string())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.full_path(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "media_storage: delete of missing object ignored");
                Ok(())
            }
            Err(source) => {
                warn!(path, error = %source, "media_storage: delete failed");
                Err(StorageError::Io {
                    path: full_path.display().to_string(),
                    source,
                })
            }
        }
    }
}

/// Process-local object store. Writes and deletes can be made to fail on demand.
#[derive(Default)]
pub struct InMemoryMediaStorage {
    objects: DashMap<String, (String, Vec<u8>)>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects.get(path).map(|entry| entry.0.clone())
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn store(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        let path = format!("memory://{}", name);
        self.objects
            .insert(path.clone(), (content_type.to_string(), bytes.to_vec()));
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("deletes disabled".to_string()));
        }
        self.objects.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filesystem_delete_of_missing_object_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemMediaStorage::new(dir.path());

        let path = storage
            .store("abc-photo.jpg", b"jpeg bytes", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(path, "abc-photo.jpg");
        assert!(dir.path().join("abc-photo.jpg").exists());

        storage.delete(&path).await.unwrap();
        assert!(!dir.path().join("abc-photo.jpg").exists());
        // Second delete of the same object must not fail
        storage.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn filesystem_rejects_keys_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemMediaStorage::new(dir.path());

        let err = storage.store("../outside", b"x", "text/plain").await;
        assert!(matches!(err, Err(StorageError::InvalidKey(_))));
        let err = storage.delete("/etc/hosts").await;
        assert!(matches!(err, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn memory_storage_failure_switches() {
        let storage = InMemoryMediaStorage::new();
        let path = storage.store("k", b"v", "image/png").await.unwrap();
        assert!(storage.contains(&path));
        assert_eq!(storage.content_type(&path).as_deref(), Some("image/png"));

        storage.set_fail_deletes(true);
        assert!(storage.delete(&path).await.is_err());
        assert!(storage.contains(&path));

        storage.set_fail_deletes(false);
        storage.delete(&path).await.unwrap();
        assert!(storage.is_empty());

        storage.set_fail_writes(true);
        assert!(storage.store("k2", b"v", "image/png").await.is_err());
    }
}
