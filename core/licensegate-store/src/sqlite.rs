//! SQLite-backed store for self-hosted deployments.
//!
//! Uses a single file holding the `licenses` and `activations` tables. Slot
//! claims run inside a `BEGIN IMMEDIATE` transaction, which takes the write
//! lock up front, so the limit read, the count check and the insert cannot
//! interleave with another writer (including one in a different process).

use crate::error::{StoreError, StoreResult};
use crate::record::{Activation, ClaimOutcome, License};
use crate::store::ActivationStore;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistent store backed by SQLite.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licenses (
                license_key TEXT PRIMARY KEY,
                max_devices INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS activations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                license_key TEXT NOT NULL,
                pc_id TEXT NOT NULL,
                activated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(license_key, pc_id)
            );
            ",
        )?;
        Ok(())
    }

    /// Provisions (or replaces) a license.
    pub fn upsert_license(&self, license: &License) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO licenses (license_key, max_devices) VALUES (?1, ?2)
             ON CONFLICT(license_key) DO UPDATE SET max_devices = excluded.max_devices",
            params![license.license_key, i64::from(license.max_devices)],
        )?;
        Ok(())
    }

    /// Runs `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl ActivationStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn find_license(&self, license_key: &str) -> StoreResult<Option<License>> {
        let key = license_key.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT license_key, max_devices FROM licenses WHERE license_key = ?1",
                    params![key],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            Ok(row.map(|(k, max)| License::from_stored(k, max)))
        })
        .await
    }

    async fn list_activations(&self, license_key: &str) -> StoreResult<Vec<Activation>> {
        let key = license_key.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT license_key, pc_id FROM activations WHERE license_key = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![key], |row| {
                Ok(Activation {
                    license_key: row.get(0)?,
                    pc_id: row.get(1)?,
                })
            })?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
    }

    async fn claim_slot(&self, license_key: &str, pc_id: &str) -> StoreResult<ClaimOutcome> {
        let key = license_key.to_string();
        let pc = pc_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let max_devices = tx
                .query_row(
                    "SELECT max_devices FROM licenses WHERE license_key = ?1",
                    params![key],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?
                .unwrap_or(0)
                .max(0);

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM activations WHERE license_key = ?1 AND pc_id = ?2)",
                params![key, pc],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(ClaimOutcome::AlreadyActive);
            }

            let used: i64 = tx.query_row(
                "SELECT COUNT(*) FROM activations WHERE license_key = ?1",
                params![key],
                |row| row.get(0),
            )?;
            if used >= max_devices {
                debug!(license_key = %key, used, max_devices, "sqlite claim refused");
                return Ok(ClaimOutcome::LimitReached);
            }

            tx.execute(
                "INSERT INTO activations (license_key, pc_id) VALUES (?1, ?2)",
                params![key, pc],
            )?;
            tx.commit()?;
            Ok(ClaimOutcome::Inserted)
        })
        .await
    }
}
