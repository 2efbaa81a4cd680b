//! Structured on-device tier backed by SQLite
//!
//! Entries live in a `shares` table with one row per entry, indexed by
//! creation and update time so retention queries stay cheap. The
//! connection is opened lazily on first use and all database work runs
//! on the blocking thread pool.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::StorageTier;
use crate::entry::{ShareEntry, ShareId};
use crate::error::{Error, Result};

const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Storage tier keeping one row per entry in a SQLite database
pub struct StructuredTier {
    location: Location,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl StructuredTier {
    /// Tier backed by a database file, created on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Tier backed by an in-memory database
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of stored entries
    pub async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM shares", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Up to `limit` entries, least recently updated first.
    ///
    /// Ties on `updated_at` are broken by id so the order is stable.
    pub async fn oldest_updated(&self, limit: usize) -> Result<Vec<ShareEntry>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at, updated_at FROM shares
                 ORDER BY updated_at ASC, id ASC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], row_to_entry)?;

            let mut entries = Vec::new();
            for entry in rows {
                entries.push(entry?);
            }
            Ok(entries)
        })
        .await
    }

    // Internal methods

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let location = self.location.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            if guard.is_none() {
                *guard = Some(open_database(&location)?);
            }
            let conn = guard
                .as_ref()
                .ok_or_else(|| Error::database("connection unavailable"))?;
            f(conn)
        })
        .await
        .map_err(|e| Error::database(format!("database task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageTier for StructuredTier {
    fn name(&self) -> &str {
        "structured"
    }

    async fn get(&self, id: &str) -> Result<Option<ShareEntry>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let entry = conn
                .query_row(
                    "SELECT id, content, created_at, updated_at FROM shares WHERE id = ?1",
                    params![id],
                    row_to_entry,
                )
                .optional()?;
            Ok(entry)
        })
        .await
    }

    async fn set(&self, entry: &ShareEntry) -> Result<()> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO shares (id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     content = excluded.content,
                     created_at = excluded.created_at,
                     updated_at = excluded.updated_at",
                params![entry.id, entry.content, entry.created_at, entry.updated_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM shares WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }

    async fn has(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let found = conn
                .query_row("SELECT 1 FROM shares WHERE id = ?1", params![id], |_| {
                    Ok(())
                })
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn get_all(&self) -> Result<HashMap<ShareId, ShareEntry>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, content, created_at, updated_at FROM shares")?;
            let rows = stmt.query_map([], row_to_entry)?;

            let mut map = HashMap::new();
            for entry in rows {
                let entry = entry?;
                map.insert(entry.id.clone(), entry);
            }
            Ok(map)
        })
        .await
    }
}

fn open_database(location: &Location) -> Result<Connection> {
    let conn = match location {
        Location::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        }
        Location::Memory => Connection::open_in_memory()?,
    };
    apply_schema(&conn)?;
    Ok(conn)
}

fn apply_schema(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS shares (
            id         TEXT PRIMARY KEY,
            content    TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_shares_created_at ON shares (created_at);
        CREATE INDEX IF NOT EXISTS idx_shares_updated_at ON shares (updated_at);",
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    debug!(version = SCHEMA_VERSION, "Applied share database schema");
    Ok(())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ShareEntry> {
    Ok(ShareEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}
