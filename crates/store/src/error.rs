/// Error type for callback storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure (missing directory, permissions, disk full, ...).
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("Record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Every candidate file name for the record was already taken.
    #[error("No free record name after {attempts} attempts starting at {first}")]
    NameExhausted { first: String, attempts: u32 },
}
