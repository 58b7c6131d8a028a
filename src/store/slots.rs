use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::StorageError;

/// Size-bounded key-value storage holding one string value per named slot.
#[async_trait]
pub trait SlotStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the slot's value. Fails with `CapacityExceeded` when the
    /// total stored size would go over the quota.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process slots, optionally capped at `quota` bytes (keys plus values).
#[derive(Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl SlotStorage for MemorySlots {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.lock()?;

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::CapacityExceeded);
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slots persisted as `<dir>/<key>.json`, capped at `quota_bytes` across all slots.
pub struct FileSlots {
    dir: PathBuf,
    quota_bytes: usize,
}

impl FileSlots {
    /// Open (creating if needed) a slot directory.
    pub async fn open(dir: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, quota_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid slot key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Bytes used by every slot other than `except`.
    async fn used_bytes(&self, except: &Path) -> Result<usize, StorageError> {
        let mut used = 0usize;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == except || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            used += entry.metadata().await?.len() as usize;
        }
        Ok(used)
    }
}

#[async_trait]
impl SlotStorage for FileSlots {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;

        let used = self.used_bytes(&path).await?;
        if used + value.len() > self.quota_bytes {
            return Err(StorageError::CapacityExceeded);
        }

        // Write beside the slot and rename so readers never see a partial value.
        let tmp = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp, value).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_error(e));
        }
        Ok(())
    }
}

/// A full disk is a capacity problem, not a generic I/O failure.
fn write_error(e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::StorageFull => StorageError::CapacityExceeded,
        _ => StorageError::Io(e),
    }
}
