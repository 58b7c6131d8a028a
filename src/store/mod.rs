pub mod journal;
pub mod slots;
pub mod table;

use async_trait::async_trait;

use crate::models::PersistedSubmission;

pub use journal::{DEFAULT_RETENTION, JOURNAL_KEY, JournalStore};
pub use slots::{FileSlots, MemorySlots, SlotStorage};
pub use table::TableStore;

/// Errors raised while reading or writing contact submissions.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The write would exceed the space available to the store.
    #[error("storage capacity exceeded")]
    CapacityExceeded,

    /// The backing storage could not be read.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Stored content is not a JSON array.
    #[error("stored journal is corrupt: {0}")]
    Corrupt(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Append-only destination for persisted submissions.
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// across request tasks behind an `Arc`.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    fn name(&self) -> &str;

    /// Write one record. Ownership of the record passes to the store.
    async fn append(&self, record: PersistedSubmission) -> Result<(), StorageError>;
}
