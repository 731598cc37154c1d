//! Persistence for ingested callbacks.
//!
//! [`CallbackStore`] is the seam between the HTTP layer and the backing
//! storage. The default backend, [`FileCallbackStore`], keeps one JSON file
//! per record in a directory and uses the file name as the only index.

use async_trait::async_trait;
use hookecho_core::record::{CallbackRecord, RecordKey};

pub mod error;
pub mod file_store;

pub use error::StoreError;
pub use file_store::FileCallbackStore;

/// A stored record together with its parsed content.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub key: RecordKey,
    pub data: serde_json::Value,
}

/// Key-value store for callback records.
#[async_trait]
pub trait CallbackStore: Send + Sync {
    /// Persist a new record for `correlation_id` and return the key it was
    /// stored under. Never overwrites an existing record.
    async fn put(&self, correlation_id: &str, record: &CallbackRecord)
        -> Result<RecordKey, StoreError>;

    /// Keys of every stored record, sorted by timestamp ascending.
    async fn list(&self) -> Result<Vec<RecordKey>, StoreError>;

    /// Records whose correlation id equals `correlation_id`, sorted by
    /// timestamp ascending. Unreadable records are skipped.
    async fn query_by_correlation(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Check that the backing storage is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
