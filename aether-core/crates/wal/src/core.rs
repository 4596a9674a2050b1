//! The WAL actor (§4.9, §5): owned state behind a single async mutex, a
//! narrow `append`/`commit`/`uncommitted`/`recover`/`close` surface. Pure
//! math never touches this file; every method here is a suspend point.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::entry::Entry;
use crate::errors::WalError;
use crate::storage::WalStorage;

struct WalState {
    next_entry_id: u64,
    uncommitted: BTreeMap<u64, Entry>,
}

/// A crash-consistent, ordered log generic over its storage backend.
/// Within one `Wal` instance, operations execute in call order (the
/// single `tokio::sync::Mutex` encodes the "one logical task at a time"
/// rule from §5); across actors callers serialize through this WAL if
/// they need a total order.
pub struct Wal<S: WalStorage> {
    storage: Arc<S>,
    state: Mutex<WalState>,
}

fn now_ns() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

impl<S: WalStorage> Wal<S> {
    pub fn new(storage: S) -> Self {
        Wal {
            storage: Arc::new(storage),
            state: Mutex::new(WalState {
                next_entry_id: 0,
                uncommitted: BTreeMap::new(),
            }),
        }
    }

    /// Assigns the next `entry_id`, writes an uncommitted record, and
    /// fsyncs before returning — the entry is durable (as uncommitted)
    /// the moment this call resolves.
    pub async fn append(
        &self,
        hash: [u8; 32],
        signed_entry_bytes: Vec<u8>,
        merkle_state: Vec<u8>,
    ) -> Result<Entry, WalError> {
        let mut state = self.state.lock().await;
        let entry_id = state.next_entry_id;

        let entry = Entry {
            entry_id,
            hash,
            signed_entry_bytes,
            merkle_state,
            committed: false,
            timestamp_ns: now_ns(),
        };

        self.storage.append_record(&entry).await?;
        state.next_entry_id = entry_id + 1;
        state.uncommitted.insert(entry_id, entry.clone());
        Ok(entry)
    }

    /// Marks `entry` committed: writes the updated record, fsyncs, then
    /// drops it from the uncommitted set.
    pub async fn commit(&self, entry: &Entry) -> Result<Entry, WalError> {
        let mut state = self.state.lock().await;
        if !state.uncommitted.contains_key(&entry.entry_id) {
            return Err(WalError::UnknownUncommittedEntry {
                entry_id: entry.entry_id,
            });
        }

        let committed = entry.committed();
        self.storage.update_record(&committed).await?;
        state.uncommitted.remove(&entry.entry_id);
        Ok(committed)
    }

    /// Snapshot of entries not yet committed, ordered by `entry_id`.
    pub async fn uncommitted(&self) -> Vec<Entry> {
        self.state.lock().await.uncommitted.values().cloned().collect()
    }

    /// Reads every persisted record, splits it into the committed subset
    /// (returned) and the uncommitted tail (restored into actor state),
    /// and resets `next_entry_id` to `max(entry_id) + 1`.
    pub async fn recover(&self) -> Result<Vec<Entry>, WalError> {
        let records = self.storage.read_all().await?;

        let max_id = records.iter().map(|e| e.entry_id).max();
        let mut committed = Vec::new();
        let mut uncommitted = BTreeMap::new();
        for entry in records {
            if entry.committed {
                committed.push(entry);
            } else {
                uncommitted.insert(entry.entry_id, entry);
            }
        }
        committed.sort_by_key(|e| e.entry_id);

        let mut state = self.state.lock().await;
        state.next_entry_id = max_id.map(|id| id + 1).unwrap_or(0);
        state.uncommitted = uncommitted;

        tracing::info!(
            committed = committed.len(),
            uncommitted = state.uncommitted.len(),
            "wal recovered"
        );
        Ok(committed)
    }

    pub async fn close(&self) -> Result<(), WalError> {
        self.storage.close().await
    }
}
