//! The `WalStorage` boundary and its file-backed implementation (§4.9,
//! §9 "prefer traits at the WAL boundary").

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::entry::{encode_record, try_decode_record, Entry};
use crate::errors::WalError;

/// Durable storage for WAL records. Every method that mutates state must
/// not return until the write is fsynced — callers (the `Wal` actor) rely
/// on that to uphold "append/commit is durable before it returns" (§5).
#[async_trait]
pub trait WalStorage: Send + Sync {
    /// Appends a brand-new record. For backends that model storage as an
    /// append-only log, writing an update for an existing `entry_id` must
    /// also go through this path — see [`WalStorage::update_record`].
    async fn append_record(&self, entry: &Entry) -> Result<(), WalError>;

    /// Persists a changed view of an already-appended entry (currently
    /// only used to flip `committed` to `true`). File-backed storage
    /// implements this by re-appending the same `entry_id`; readers take
    /// the last occurrence.
    async fn update_record(&self, entry: &Entry) -> Result<(), WalError>;

    /// Reads every persisted record, deduplicated to the last occurrence
    /// per `entry_id`, ordered by `entry_id`.
    async fn read_all(&self) -> Result<Vec<Entry>, WalError>;

    /// Forces the platform file-sync primitive. Exposed separately from
    /// the write methods so tests can assert durability boundaries.
    async fn fsync(&self) -> Result<(), WalError>;

    async fn close(&self) -> Result<(), WalError>;
}

/// File-backed storage: `[entry_id | committed | timestamp_ns | hash_len |
/// hash | signed_len | signed | merkle_len | merkle]` records, appended
/// and re-appended (never rewritten in place), fsynced after every write.
pub struct FileWalStorage {
    file: Mutex<tokio::fs::File>,
    path: std::path::PathBuf,
}

impl FileWalStorage {
    pub async fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, WalError> {
        let path = path.into();
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| WalError::Io(e.to_string()))?;
        Ok(FileWalStorage {
            file: Mutex::new(file),
            path,
        })
    }

    async fn append_bytes(&self, bytes: &[u8]) -> Result<(), WalError> {
        let mut file = self.file.lock().await;
        file.write_all(bytes)
            .await
            .map_err(|e| WalError::Io(e.to_string()))?;
        file.flush().await.map_err(|e| WalError::Io(e.to_string()))?;
        file.sync_all().await.map_err(|e| WalError::Io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl WalStorage for FileWalStorage {
    async fn append_record(&self, entry: &Entry) -> Result<(), WalError> {
        self.append_bytes(&encode_record(entry)).await
    }

    async fn update_record(&self, entry: &Entry) -> Result<(), WalError> {
        self.append_bytes(&encode_record(entry)).await
    }

    async fn read_all(&self) -> Result<Vec<Entry>, WalError> {
        let mut contents = Vec::new();
        {
            let mut file = tokio::fs::File::open(&self.path)
                .await
                .map_err(|e| WalError::Io(e.to_string()))?;
            file.seek(std::io::SeekFrom::Start(0))
                .await
                .map_err(|e| WalError::Io(e.to_string()))?;
            file.read_to_end(&mut contents)
                .await
                .map_err(|e| WalError::Io(e.to_string()))?;
        }

        let mut by_id: std::collections::BTreeMap<u64, Entry> = std::collections::BTreeMap::new();
        let mut offset = 0usize;
        while offset < contents.len() {
            match try_decode_record(&contents[offset..])? {
                Some((entry, consumed)) => {
                    by_id.insert(entry.entry_id, entry);
                    offset += consumed;
                }
                None => break,
            }
        }
        Ok(by_id.into_values().collect())
    }

    async fn fsync(&self) -> Result<(), WalError> {
        let file = self.file.lock().await;
        file.sync_all().await.map_err(|e| WalError::Io(e.to_string()))
    }

    async fn close(&self) -> Result<(), WalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, committed: bool) -> Entry {
        Entry {
            entry_id: id,
            hash: [id as u8; 32],
            signed_entry_bytes: format!("signed-{id}").into_bytes(),
            merkle_state: format!("merkle-{id}").into_bytes(),
            committed,
            timestamp_ns: 1_000 + id,
        }
    }

    #[tokio::test]
    async fn test_append_then_read_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileWalStorage::open(dir.path().join("wal.log")).await.unwrap();
        storage.append_record(&entry(1, false)).await.unwrap();
        storage.append_record(&entry(2, false)).await.unwrap();

        let all = storage.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].entry_id, 1);
        assert_eq!(all[1].entry_id, 2);
    }

    #[tokio::test]
    async fn test_update_record_supersedes_via_last_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileWalStorage::open(dir.path().join("wal.log")).await.unwrap();
        storage.append_record(&entry(1, false)).await.unwrap();
        storage.update_record(&entry(1, true)).await.unwrap();

        let all = storage.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].committed);
    }

    #[tokio::test]
    async fn test_reopening_storage_sees_prior_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wal.log");
        {
            let storage = FileWalStorage::open(&path).await.unwrap();
            storage.append_record(&entry(1, true)).await.unwrap();
        }
        let storage = FileWalStorage::open(&path).await.unwrap();
        let all = storage.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].entry_id, 1);
    }
}
