//! Object store implementations for attachment content

use crate::domain::ObjectStore;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Stores objects as files below a root directory
pub struct FsObjectStore {
    root_dir: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at `root_dir`, creating the directory if needed
    pub async fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir)
            .await
            .with_context(|| format!("failed to create object store at {}", root_dir.display()))?;

        info!(path = %root_dir.display(), "Initialized filesystem object store");
        Ok(Self { root_dir })
    }

    /// Path of `key`; keys may only contain plain relative segments
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("invalid object key '{key}'");
        }
        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &content)
            .await
            .with_context(|| format!("failed to write object '{key}'"))?;

        debug!(key, size = content.len(), content_type, "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key)?;
        let content = fs::read(&path)
            .await
            .with_context(|| format!("failed to read object '{key}'"))?;
        Ok(Bytes::from(content))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        fs::remove_file(&path)
            .await
            .with_context(|| format!("failed to delete object '{key}'"))?;

        debug!(key, "Deleted object");
        Ok(())
    }
}

/// Keeps objects in process memory
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content: Bytes, _content_type: &str) -> Result<()> {
        self.objects.write().insert(key.to_string(), content);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("object '{key}' not found"))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| anyhow!("object '{key}' not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).await.unwrap();

        store
            .put("12/1700000000000-abc.pdf", Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await
            .unwrap();
        assert!(dir.path().join("12/1700000000000-abc.pdf").exists());

        let content = store.get("12/1700000000000-abc.pdf").await.unwrap();
        assert_eq!(&content[..], b"%PDF-1.7");

        store.delete("12/1700000000000-abc.pdf").await.unwrap();
        assert!(store.get("12/1700000000000-abc.pdf").await.is_err());
    }

    #[tokio::test]
    async fn fs_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).await.unwrap();

        for key in ["../outside.pdf", "/etc/passwd", "", "1/../../x.pdf"] {
            assert!(
                store.put(key, Bytes::from_static(b"x"), "text/plain").await.is_err(),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn memory_store_delete_missing_fails() {
        let store = MemoryObjectStore::new();
        store
            .put("1/a.csv", Bytes::from_static(b"a,b"), "text/csv")
            .await
            .unwrap();
        assert!(store.contains("1/a.csv"));

        store.delete("1/a.csv").await.unwrap();
        assert!(store.is_empty());
        assert!(store.delete("1/a.csv").await.is_err());
    }
}
