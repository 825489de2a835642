use crate::model::{LookupResult, StorageError};
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;

/// A row result persisted by an earlier (possibly interrupted) run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    /// Digest of the row cells, column mapping and price filter the result
    /// was resolved under.
    pub fingerprint: String,
    pub result: LookupResult,
    pub resolved_at: DateTime<Utc>,
}

/// Checkpoint of per-row results, keyed by batch and row index.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the schema if needed. `":memory:"` works
    /// for throwaway stores.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS checkpoint_rows (
                batch_key TEXT NOT NULL,
                row_index INTEGER NOT NULL,
                fingerprint TEXT NOT NULL,
                found INTEGER NOT NULL,
                price INTEGER,
                query_or_marker TEXT NOT NULL,
                payload TEXT NOT NULL,
                resolved_at TEXT NOT NULL,
                PRIMARY KEY (batch_key, row_index)
            );
            "
        )?;

        Ok(Self { conn })
    }

    /// Inserts or replaces the result of one row.
    pub fn save_result(
        &self,
        batch_key: &str,
        row_index: usize,
        fingerprint: &str,
        result: &LookupResult,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(result).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let price = match result {
            LookupResult::Found(m) => Some(m.price as i64),
            LookupResult::NotFound(_) => None,
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO checkpoint_rows (
                batch_key, row_index, fingerprint, found, price, query_or_marker, payload, resolved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                batch_key,
                row_index as i64,
                fingerprint,
                result.is_found(),
                price,
                result.query_or_marker(),
                payload,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All stored results of a batch, by row index.
    pub fn load_results(&self, batch_key: &str) -> Result<HashMap<usize, StoredResult>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT row_index, fingerprint, payload, resolved_at FROM checkpoint_rows WHERE batch_key = ?1",
        )?;

        let rows = stmt.query_map(params![batch_key], |row| {
            let index: i64 = row.get(0)?;
            let fingerprint: String = row.get(1)?;
            let payload: String = row.get(2)?;
            let resolved_at: String = row.get(3)?;
            Ok((index, fingerprint, payload, resolved_at))
        })?;

        let mut results = HashMap::new();
        for row in rows {
            let (index, fingerprint, payload, resolved_at) = row?;
            let result: LookupResult = serde_json::from_str(&payload)
                .map_err(|e| StorageError::Corrupt(format!("row {}: {}", index, e)))?;
            let resolved_at = parse_datetime(&resolved_at)
                .ok_or_else(|| StorageError::Corrupt(format!("row {}: bad timestamp {}", index, resolved_at)))?;
            results.insert(index as usize, StoredResult { fingerprint, result, resolved_at });
        }

        Ok(results)
    }

    /// Forgets a batch so the next run starts from scratch.
    pub fn clear_batch(&self, batch_key: &str) -> Result<usize, StorageError> {
        let deleted = self
            .conn
            .execute("DELETE FROM checkpoint_rows WHERE batch_key = ?1", params![batch_key])?;
        Ok(deleted)
    }
}
