//! Object storage abstraction for attachment content

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Content store keyed by opaque, slash-separated keys
///
/// Implementations live in infra/object_store.rs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `content` under `key`, replacing any previous object
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> anyhow::Result<()>;

    /// Read the object stored under `key`
    async fn get(&self, key: &str) -> anyhow::Result<Bytes>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Lower-cased extension of `file_name`, if any
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Storage key for a new attachment: `{project_id}/{timestamp}-{random}.{ext}`
pub fn attachment_key(project_id: i32, extension: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}.{}",
        project_id,
        now.timestamp_millis(),
        nanoid::nanoid!(12),
        extension
    )
}
