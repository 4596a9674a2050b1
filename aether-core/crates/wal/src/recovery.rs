//! Fail-closed recovery cross-verification (§4.9 "Recovery policy").
//!
//! `recover()` on the WAL actor only reads and classifies records. The
//! [`RecoveryManager`] adds the cross-check the spec calls for: every
//! committed entry's hash is 32 bytes (the storage layer already enforces
//! this while decoding — see [`crate::errors::WalError::CorruptedEntry`]),
//! and every uncommitted entry replays cleanly into both the signed audit
//! log and the Merkle tree before recovery is allowed to succeed. Any
//! replay failure aborts the whole recovery; no partial uncommitted state
//! is ever handed back to the caller.

use crate::entry::Entry;
use crate::errors::WalError;
use crate::storage::WalStorage;
use crate::Wal;

/// The signed audit log dual-written alongside the Merkle tree on every
/// commit. An external collaborator; this crate only needs the ability
/// to replay a previously-signed entry during recovery.
pub trait SignedAuditLog: Send + Sync {
    fn replay(&mut self, entry_id: u64, signed_entry_bytes: &[u8]) -> Result<(), String>;
}

/// The Merkle tree dual-written alongside the signed audit log.
pub trait MerkleTree: Send + Sync {
    fn replay(&mut self, entry_id: u64, merkle_state: &[u8]) -> Result<(), String>;
}

pub struct RecoveryManager;

impl RecoveryManager {
    /// Runs [`Wal::recover`] and then cross-verifies the result. Returns
    /// the committed list only if every uncommitted entry replayed
    /// cleanly into both collaborators.
    pub async fn recover<S: WalStorage>(
        wal: &Wal<S>,
        audit_log: &mut dyn SignedAuditLog,
        merkle_tree: &mut dyn MerkleTree,
    ) -> Result<Vec<Entry>, WalError> {
        let committed = wal.recover().await?;
        let pending = wal.uncommitted().await;

        for entry in &pending {
            audit_log
                .replay(entry.entry_id, &entry.signed_entry_bytes)
                .map_err(|reason| WalError::RecoveryFailed {
                    reason: format!("audit log replay failed for entry {}: {reason}", entry.entry_id),
                })?;
            merkle_tree
                .replay(entry.entry_id, &entry.merkle_state)
                .map_err(|reason| WalError::RecoveryFailed {
                    reason: format!("merkle replay failed for entry {}: {reason}", entry.entry_id),
                })?;
        }

        Ok(committed)
    }
}
