//! Directory-of-JSON-files callback store.
//!
//! A record is first written in full to a dot-prefixed temp file, then
//! published under its final `{timestampMillis}_{correlationId}.json` name
//! with a hard link. Linking never replaces an existing name, so when the name
//! for the current millisecond is taken (same correlation id within the same
//! millisecond) the timestamp is advanced one millisecond at a time until a
//! free name is found. Listings only ever see complete records.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hookecho_core::clock::Clock;
use hookecho_core::record::{CallbackRecord, RecordKey};
use tokio::io::AsyncWriteExt;

use crate::{CallbackStore, StoreError, StoredRecord};

/// Upper bound on candidate names tried for a single write.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Per-process sequence for temp file names.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Callback store backed by a directory of `{ts}_{id}.json` files.
pub struct FileCallbackStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCallbackStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    /// Create the storage directory (and parents) if missing.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Absolute location of a record file.
    pub fn path_for(&self, key: &RecordKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Unique hidden name in the store directory. Never parses as a record.
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".pending-{}-{seq}.tmp", std::process::id()))
    }

    /// Write `contents` to a fresh temp file. Nothing is left behind on error.
    async fn write_temp(&self, contents: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.temp_path();
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(contents).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            discard(&path).await;
            return Err(e.into());
        }
        Ok(path)
    }

    async fn read_record(&self, key: &RecordKey) -> Option<serde_json::Value> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable callback record");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt callback record");
                None
            }
        }
    }
}

#[async_trait]
impl CallbackStore for FileCallbackStore {
    async fn put(
        &self,
        correlation_id: &str,
        record: &CallbackRecord,
    ) -> Result<RecordKey, StoreError> {
        let contents = serde_json::to_vec(record)?;
        let temp = self.write_temp(&contents).await?;

        let first = RecordKey::new(self.clock.now_millis(), correlation_id);
        let mut key = first.clone();

        for _ in 0..MAX_NAME_ATTEMPTS {
            match tokio::fs::hard_link(&temp, self.path_for(&key)).await {
                Ok(()) => {
                    discard(&temp).await;
                    tracing::debug!(file_name = %key.file_name(), "Callback record written");
                    return Ok(key);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        file_name = %key.file_name(),
                        "Record name taken, advancing timestamp"
                    );
                    key = key.successor();
                }
                Err(e) => {
                    discard(&temp).await;
                    return Err(e.into());
                }
            }
        }

        discard(&temp).await;
        Err(StoreError::NameExhausted {
            first: first.file_name(),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    async fn list(&self) -> Result<Vec<RecordKey>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match RecordKey::parse(name) {
                Some(key) => keys.push(key),
                None => tracing::trace!(file_name = name, "Ignoring non-record file"),
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn query_by_correlation(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let mut records = Vec::new();

        for key in self.list().await? {
            if key.correlation_id != correlation_id {
                continue;
            }
            if let Some(data) = self.read_record(&key).await {
                records.push(StoredRecord { key, data });
            }
        }

        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let metadata = tokio::fs::metadata(&self.dir).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Io(std::io::Error::other(format!(
                "{} is not a directory",
                self.dir.display()
            ))))
        }
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp record file");
    }
}
