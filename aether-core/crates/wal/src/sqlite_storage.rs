//! SQLite-WAL-backed [`WalStorage`] (§4.9): a single `wal_entries` table
//! under `PRAGMA journal_mode=WAL`, with `fsync` implemented as a full
//! checkpoint rather than a file-level `fsync` syscall.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::entry::Entry;
use crate::errors::WalError;
use crate::storage::WalStorage;

pub struct SqliteWalStorage {
    pool: SqlitePool,
}

impl SqliteWalStorage {
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self, WalError> {
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            path.as_ref().display()
        ))
        .map_err(|e| WalError::Sqlite(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| WalError::Sqlite(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS wal_entries (
                entry_id INTEGER PRIMARY KEY,
                hash BLOB NOT NULL,
                signed_entry_bytes BLOB NOT NULL,
                merkle_state BLOB NOT NULL,
                committed INTEGER NOT NULL,
                timestamp INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| WalError::Sqlite(e.to_string()))?;

        Ok(SqliteWalStorage { pool })
    }

    async fn upsert(&self, entry: &Entry) -> Result<(), WalError> {
        sqlx::query(
            "INSERT INTO wal_entries (entry_id, hash, signed_entry_bytes, merkle_state, committed, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(entry_id) DO UPDATE SET
                hash = excluded.hash,
                signed_entry_bytes = excluded.signed_entry_bytes,
                merkle_state = excluded.merkle_state,
                committed = excluded.committed,
                timestamp = excluded.timestamp",
        )
        .bind(entry.entry_id as i64)
        .bind(entry.hash.to_vec())
        .bind(entry.signed_entry_bytes.clone())
        .bind(entry.merkle_state.clone())
        .bind(entry.committed as i64)
        .bind(entry.timestamp_ns as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| WalError::Sqlite(e.to_string()))?;

        self.fsync().await
    }
}

#[async_trait]
impl WalStorage for SqliteWalStorage {
    async fn append_record(&self, entry: &Entry) -> Result<(), WalError> {
        self.upsert(entry).await
    }

    async fn update_record(&self, entry: &Entry) -> Result<(), WalError> {
        self.upsert(entry).await
    }

    async fn read_all(&self) -> Result<Vec<Entry>, WalError> {
        let rows = sqlx::query(
            "SELECT entry_id, hash, signed_entry_bytes, merkle_state, committed, timestamp
             FROM wal_entries ORDER BY entry_id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WalError::Sqlite(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry_id: i64 = row.try_get("entry_id").map_err(|e| WalError::Sqlite(e.to_string()))?;
            let hash_bytes: Vec<u8> = row.try_get("hash").map_err(|e| WalError::Sqlite(e.to_string()))?;
            if hash_bytes.len() != 32 {
                return Err(WalError::CorruptedEntry {
                    entry_id: entry_id as u64,
                    reason: format!("hash column is {} bytes, expected 32", hash_bytes.len()),
                });
            }
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&hash_bytes);

            entries.push(Entry {
                entry_id: entry_id as u64,
                hash,
                signed_entry_bytes: row
                    .try_get("signed_entry_bytes")
                    .map_err(|e| WalError::Sqlite(e.to_string()))?,
                merkle_state: row
                    .try_get("merkle_state")
                    .map_err(|e| WalError::Sqlite(e.to_string()))?,
                committed: row.try_get::<i64, _>("committed").map_err(|e| WalError::Sqlite(e.to_string()))? != 0,
                timestamp_ns: row.try_get::<i64, _>("timestamp").map_err(|e| WalError::Sqlite(e.to_string()))? as u64,
            });
        }
        Ok(entries)
    }

    async fn fsync(&self) -> Result<(), WalError> {
        sqlx::query("PRAGMA wal_checkpoint(FULL)")
            .execute(&self.pool)
            .await
            .map_err(|e| WalError::Sqlite(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), WalError> {
        self.pool.close().await;
        Ok(())
    }
}
