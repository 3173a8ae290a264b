use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension, params};

use super::{CACHE_DOCUMENT, ROSTER_DOCUMENT, RadarState, StateStore, decode_document};
use crate::device::ClassificationCache;
use crate::error::StoreError;
use crate::presence::PresenceRegistry;

/// Same two documents as the JSON store, kept as rows of a `documents` table.
/// Both rows are replaced inside one transaction.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let store = Self { path };
        let conn = store.connection()?;
        Self::create_table_if_not_exists(&conn)?;
        tracing::info!("SQLite store at {}", store.path.display());
        Ok(store)
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        // Concurrent readers wait instead of failing while an ingest commits
        let _ = conn.execute_batch("PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;");
        Ok(conn)
    }

    pub fn create_table_if_not_exists(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn read_document(&self, name: &str) -> Result<String, StoreError> {
        let conn = self.connection()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body.unwrap_or_default())
    }
}

impl StateStore for SqliteStore {
    fn load_registry(&self) -> Result<PresenceRegistry, StoreError> {
        let body = self.read_document(ROSTER_DOCUMENT)?;
        Ok(decode_document(ROSTER_DOCUMENT, &body))
    }

    fn load_cache(&self) -> Result<ClassificationCache, StoreError> {
        let body = self.read_document(CACHE_DOCUMENT)?;
        Ok(decode_document(CACHE_DOCUMENT, &body))
    }

    fn persist(&self, state: &RadarState) -> Result<(), StoreError> {
        let roster = serde_json::to_string(&state.registry)?;
        let cache = serde_json::to_string(&state.cache)?;
        let now = chrono::Utc::now().timestamp();

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        for (name, body) in [(ROSTER_DOCUMENT, &roster), (CACHE_DOCUMENT, &cache)] {
            tx.execute(
                "INSERT INTO documents (name, body, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET body = ?2, updated_at = ?3",
                params![name, body, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
