//! Crash-consistent write-ahead log (§4.9): `append`/`commit`/`recover`
//! over a pluggable [`WalStorage`] backend, plus the fail-closed
//! [`RecoveryManager`] that cross-verifies recovered state against the
//! signed audit log and the Merkle tree before handing anything back.
//!
//! Pure value types ([`Entry`]) are immutable and freely shareable; every
//! mutating operation on [`Wal`] is a suspend point (§5) and none of them
//! panic on bad input — storage corruption and replay failure both
//! surface as typed [`WalError`] variants.

pub mod core;
pub mod entry;
pub mod errors;
pub mod recovery;
pub mod sqlite_storage;
pub mod storage;

pub use core::Wal;
pub use entry::Entry;
pub use errors::WalError;
pub use recovery::{MerkleTree, RecoveryManager, SignedAuditLog};
pub use sqlite_storage::SqliteWalStorage;
pub use storage::{FileWalStorage, WalStorage};
