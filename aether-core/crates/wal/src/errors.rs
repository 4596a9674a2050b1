use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("entry {entry_id} is corrupted: {reason}")]
    CorruptedEntry { entry_id: u64, reason: String },

    #[error("recovery failed: {reason}")]
    RecoveryFailed { reason: String },

    #[error("entry {entry_id} is not in the uncommitted set")]
    UnknownUncommittedEntry { entry_id: u64 },
}
