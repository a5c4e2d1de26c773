//! Storage seam for the contract: transactional key-value state with a
//! per-key version history.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::Result;
use crate::types::HistoryEntry;

/// Commit metadata attached to every write
#[derive(Clone, Debug)]
pub struct WriteMeta {
    pub tx_id: String,
    pub timestamp: String,
}

impl WriteMeta {
    pub fn new(tx_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Equality selector over top-level string fields of stored JSON values
#[derive(Clone, Debug, Default)]
pub struct Selector {
    fields: BTreeMap<String, String>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// True when every selector field matches the value's top-level string
    pub fn matches(&self, value: &Value) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        self.fields
            .iter()
            .all(|(k, v)| obj.get(k).and_then(Value::as_str) == Some(v.as_str()))
    }
}

/// Ledger storage interface.
///
/// Backends with real commit-time conflict detection surface rejected
/// writes as [`crate::Error::CommitConflict`]; the contract never raises
/// it itself.
pub trait LedgerStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8], meta: &WriteMeta) -> Result<()>;
    fn delete(&self, key: &str, meta: &WriteMeta) -> Result<()>;
    /// Values matching the selector, in ascending key order
    fn query(&self, selector: &Selector) -> Result<Vec<Vec<u8>>>;
    /// All committed versions of a key, oldest first; empty for unknown keys
    fn history(&self, key: &str) -> Result<Vec<HistoryEntry>>;
}

fn history_value(value: Option<&[u8]>) -> Value {
    match value {
        None => Value::Null,
        Some(bytes) => serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

#[derive(Default)]
struct Inner {
    state: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<HistoryEntry>>,
}

/// In-memory store for tests and single-process harnesses.
///
/// Writes are serialized by the process's own lock, so this backend never
/// observes a commit conflict.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<Inner>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.lock_read();
        Ok(inner.state.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8], meta: &WriteMeta) -> Result<()> {
        let mut inner = self.lock_write();
        inner.state.insert(key.to_string(), value.to_vec());
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id: meta.tx_id.clone(),
                timestamp: meta.timestamp.clone(),
                is_delete: false,
                value: history_value(Some(value)),
            });
        Ok(())
    }

    fn delete(&self, key: &str, meta: &WriteMeta) -> Result<()> {
        let mut inner = self.lock_write();
        inner.state.remove(key);
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id: meta.tx_id.clone(),
                timestamp: meta.timestamp.clone(),
                is_delete: true,
                value: Value::Null,
            });
        Ok(())
    }

    fn query(&self, selector: &Selector) -> Result<Vec<Vec<u8>>> {
        let inner = self.lock_read();
        let mut out = Vec::new();
        for value in inner.state.values() {
            if let Ok(parsed) = serde_json::from_slice::<Value>(value) {
                if selector.matches(&parsed) {
                    out.push(value.clone());
                }
            }
        }
        Ok(out)
    }

    fn history(&self, key: &str) -> Result<Vec<HistoryEntry>> {
        let inner = self.lock_read();
        Ok(inner.history.get(key).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// SQLite-backed durable LedgerStore
// ---------------------------------------------------------------------------

#[cfg(feature = "sqlite")]
mod sqlite_store {
    use std::path::Path;
    use std::sync::Mutex;

    use rusqlite::{Connection, OptionalExtension};

    use super::{history_value, LedgerStore, Selector, WriteMeta};
    use crate::error::{Error, Result};
    use crate::types::HistoryEntry;

    const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_state (
    key   TEXT PRIMARY KEY,
    value BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS ledger_history (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    key       TEXT NOT NULL,
    tx_id     TEXT NOT NULL,
    ts        TEXT NOT NULL,
    is_delete INTEGER NOT NULL,
    value     BLOB
);

CREATE INDEX IF NOT EXISTS idx_ledger_history_key ON ledger_history (key, seq);
"#;

    /// Durable SQLite-backed ledger store
    pub struct SqliteLedgerStore {
        conn: Mutex<Connection>,
    }

    impl SqliteLedgerStore {
        /// Open (or create) the store at `path`
        pub fn new(path: impl AsRef<Path>) -> Result<Self> {
            if let Some(parent) = path.as_ref().parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Database(e.to_string()))?;
            }
            let conn = Connection::open(path).map_err(|e| Error::Database(e.to_string()))?;
            Self::init(conn)
        }

        /// Create an in-memory store (useful for tests)
        #[cfg(test)]
        pub fn in_memory() -> Result<Self> {
            let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
            Self::init(conn)
        }

        fn init(conn: Connection) -> Result<Self> {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
                .map_err(|e| Error::Database(e.to_string()))?;
            conn.execute_batch(CREATE_TABLES)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(Self {
                conn: Mutex::new(conn),
            })
        }

        fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
            self.conn.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Number of live state entries (for testing / monitoring)
        pub fn state_count(&self) -> Result<usize> {
            let conn = self.lock_conn();
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM ledger_state", [], |row| row.get(0))
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(count as usize)
        }
    }

    impl LedgerStore for SqliteLedgerStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            let conn = self.lock_conn();
            conn.query_row(
                "SELECT value FROM ledger_state WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
        }

        fn put(&self, key: &str, value: &[u8], meta: &WriteMeta) -> Result<()> {
            let mut conn = self.lock_conn();
            let tx = conn
                .transaction()
                .map_err(|e| Error::Database(e.to_string()))?;
            tx.execute(
                "INSERT OR REPLACE INTO ledger_state (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            tx.execute(
                "INSERT INTO ledger_history (key, tx_id, ts, is_delete, value) \
                 VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![key, meta.tx_id, meta.timestamp, value],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            tx.commit().map_err(|e| Error::Database(e.to_string()))
        }

        fn delete(&self, key: &str, meta: &WriteMeta) -> Result<()> {
            let mut conn = self.lock_conn();
            let tx = conn
                .transaction()
                .map_err(|e| Error::Database(e.to_string()))?;
            tx.execute(
                "DELETE FROM ledger_state WHERE key = ?1",
                rusqlite::params![key],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            tx.execute(
                "INSERT INTO ledger_history (key, tx_id, ts, is_delete, value) \
                 VALUES (?1, ?2, ?3, 1, NULL)",
                rusqlite::params![key, meta.tx_id, meta.timestamp],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
            tx.commit().map_err(|e| Error::Database(e.to_string()))
        }

        fn query(&self, selector: &Selector) -> Result<Vec<Vec<u8>>> {
            let conn = self.lock_conn();
            let mut stmt = conn
                .prepare("SELECT value FROM ledger_state ORDER BY key")
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| row.get::<_, Vec<u8>>(0))
                .map_err(|e| Error::Database(e.to_string()))?;

            let mut out = Vec::new();
            for row in rows {
                let value = row.map_err(|e| Error::Database(e.to_string()))?;
                if let Ok(parsed) = serde_json::from_slice::<serde_json::Value>(&value) {
                    if selector.matches(&parsed) {
                        out.push(value);
                    }
                }
            }
            Ok(out)
        }

        fn history(&self, key: &str) -> Result<Vec<HistoryEntry>> {
            let conn = self.lock_conn();
            let mut stmt = conn
                .prepare(
                    "SELECT tx_id, ts, is_delete, value FROM ledger_history \
                     WHERE key = ?1 ORDER BY seq ASC",
                )
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params![key], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, Option<Vec<u8>>>(3)?,
                    ))
                })
                .map_err(|e| Error::Database(e.to_string()))?;

            let mut out = Vec::new();
            for row in rows {
                let (tx_id, timestamp, is_delete, value) =
                    row.map_err(|e| Error::Database(e.to_string()))?;
                out.push(HistoryEntry {
                    tx_id,
                    timestamp,
                    is_delete,
                    value: history_value(value.as_deref()),
                });
            }
            Ok(out)
        }
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteLedgerStore;
