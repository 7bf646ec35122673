//! Storage for receipt images.

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{Error, UserID};

/// A stored file and its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A key-value store for binary files such as receipt photos.
///
/// Keys are relative, slash separated paths like `1/1710460800000.jpg`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Save `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), Error>;

    /// Load the blob saved under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> Result<Option<Blob>, Error>;

    /// Remove the blob saved under `key`. Removing a missing blob is not an error.
    async fn delete(&self, key: &str) -> Result<(), Error>;
}

/// Counts receipt keys handed out by this process.
static RECEIPT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A new key for a receipt uploaded by `user_id` at `uploaded_at`.
///
/// Keys handed out in the same millisecond differ by a sequence suffix.
/// The extension is taken from `file_name`, falling back to `jpg`.
pub fn receipt_key(user_id: UserID, file_name: &str, uploaded_at: OffsetDateTime) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .filter(|extension| {
            !extension.is_empty()
                && extension.len() <= 5
                && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "jpg".to_owned());
    let millis = uploaded_at.unix_timestamp_nanos() / 1_000_000;
    let sequence = RECEIPT_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;

    format!("{user_id}/{millis}-{sequence:04}.{extension}")
}

/// Guess the MIME type of a blob from the extension of its key.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Check that `key` is a relative path that stays inside the store.
fn validate_key(key: &str) -> Result<&Path, Error> {
    let path = Path::new(key);
    let is_valid = !key.is_empty()
        && !key.contains('\\')
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if is_valid {
        Ok(path)
    } else {
        Err(Error::InvalidBlobKey(key.to_owned()))
    }
}

/// A [BlobStore] that keeps each blob as a file under a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Store blobs under `root`. The directory is created on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        validate_key(key).map(|path| self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), Error> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| Error::BlobStorage(error.to_string()))?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|error| Error::BlobStorage(error.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, Error> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Blob {
                bytes,
                content_type: content_type_for_key(key).to_owned(),
            })),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::BlobStorage(error.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Error::BlobStorage(error.to_string())),
        }
    }
}

/// A [BlobStore] that keeps blobs in memory, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl MemoryBlobStore {
    /// The keys of every stored blob, sorted.
    pub fn keys(&self) -> Vec<String> {
        let blobs = self
            .blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut keys: Vec<String> = blobs.keys().cloned().collect();
        keys.sort();

        keys
    }
}

#[cfg(test)]
#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), Error> {
        validate_key(key)?;
        self.blobs
            .lock()
            .map_err(|_| Error::BlobStorage("lock poisoned".to_owned()))?
            .insert(key.to_owned(), bytes);

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, Error> {
        validate_key(key)?;
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::BlobStorage("lock poisoned".to_owned()))?;

        Ok(blobs.get(key).map(|bytes| Blob {
            bytes: bytes.clone(),
            content_type: content_type_for_key(key).to_owned(),
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        validate_key(key)?;
        self.blobs
            .lock()
            .map_err(|_| Error::BlobStorage("lock poisoned".to_owned()))?
            .remove(key);

        Ok(())
    }
}
