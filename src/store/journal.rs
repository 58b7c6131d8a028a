use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::models::PersistedSubmission;

use super::{SlotStorage, StorageError, SubmissionStore};

/// Slot holding the JSON-encoded journal.
pub const JOURNAL_KEY: &str = "contact_submissions";

/// Entries kept when a write runs out of space.
pub const DEFAULT_RETENTION: usize = 10;

/// Bounded, insertion-ordered journal of submissions kept in a single slot.
///
/// Every append rewrites the whole journal. When that write is refused for
/// lack of space, the journal is cut down to its most recent `retention`
/// entries (the new one included) and written once more.
///
/// Appends are serialized within this process. Separate processes sharing
/// the same slot storage can still lose each other's updates.
pub struct JournalStore {
    slots: Arc<dyn SlotStorage>,
    retention: usize,
    lock: Mutex<()>,
}

impl JournalStore {
    pub fn new(slots: Arc<dyn SlotStorage>) -> Self {
        Self {
            slots,
            retention: DEFAULT_RETENTION,
            lock: Mutex::new(()),
        }
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    /// Current journal contents, oldest first.
    ///
    /// Unreadable or corrupt content reads as empty; individual elements that
    /// are not well-formed submissions are skipped.
    pub async fn entries(&self) -> Vec<PersistedSubmission> {
        self.raw_entries()
            .await
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }

    /// Stored elements as-is. Only a slot that fails to parse or is not an
    /// array is discarded; foreign elements inside the array are kept.
    async fn raw_entries(&self) -> Vec<Value> {
        match self.read().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding unreadable contact journal: {e}");
                Vec::new()
            }
        }
    }

    async fn read(&self) -> Result<Vec<Value>, StorageError> {
        let Some(raw) = self.slots.get(JOURNAL_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(StorageError::Corrupt("journal is not an array".to_string())),
            Err(e) => Err(StorageError::Corrupt(e.to_string())),
        }
    }

    async fn write(&self, entries: &[Value]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(entries)?;
        self.slots.set(JOURNAL_KEY, &encoded).await
    }
}

#[async_trait]
impl SubmissionStore for JournalStore {
    fn name(&self) -> &str {
        "journal"
    }

    async fn append(&self, record: PersistedSubmission) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.raw_entries().await;
        entries.push(serde_json::to_value(&record)?);

        match self.write(&entries).await {
            Err(StorageError::CapacityExceeded) => {
                let keep_from = entries.len().saturating_sub(self.retention);
                tracing::warn!(
                    "Contact journal over capacity, keeping the {} most recent of {} entries",
                    entries.len() - keep_from,
                    entries.len()
                );
                self.write(&entries[keep_from..]).await
            }
            other => other,
        }
    }
}
