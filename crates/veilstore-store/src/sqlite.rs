//! SQLite implementation of the RecordBackend trait.
//!
//! This is the persistent backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use veilstore_core::{HandleId, Identity, Record, RecordFields, RecordId};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::RecordBackend;

/// SQLite-based record backend.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn blob_32(row: &rusqlite::Row<'_>, idx: usize, column: &str) -> rusqlite::Result<[u8; 32]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, column.into(), rusqlite::types::Type::Blob)
    })
}

// Column order matches RECORD_COLUMNS.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let id: i64 = row.get(0)?;
    Ok(Record {
        id: RecordId(id as u64),
        fields: RecordFields {
            name: row.get(1)?,
            category: row.get(2)?,
            contact: row.get(3)?,
        },
        rating_handle: HandleId::from_bytes(blob_32(row, 4, "rating_handle")?),
        visible: row.get(5)?,
        owner: Identity::from_bytes(blob_32(row, 6, "owner")?),
        exists: row.get(7)?,
    })
}

const RECORD_COLUMNS: &str =
    "id, name, category, contact, rating_handle, visible, owner, exists_flag";

fn next_id_in(conn: &Connection) -> Result<RecordId> {
    let max: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM records", [], |row| {
        row.get(0)
    })?;
    Ok(RecordId(max as u64 + 1))
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    async fn next_id(&self) -> Result<RecordId> {
        self.blocking(|conn| next_id_in(conn)).await
    }

    async fn insert_record(&self, record: &Record) -> Result<()> {
        let record = record.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let expected = next_id_in(&tx)?;
            if record.id != expected {
                return Err(StoreError::OutOfOrder {
                    expected,
                    got: record.id,
                });
            }

            let now = now_millis();
            tx.execute(
                "INSERT INTO records (id, name, category, contact, rating_handle, visible,
                                      owner, exists_flag, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    record.id.get() as i64,
                    record.fields.name,
                    record.fields.category,
                    record.fields.contact,
                    record.rating_handle.as_bytes().as_slice(),
                    record.visible,
                    record.owner.as_bytes().as_slice(),
                    record.exists,
                    now,
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        if id.get() == 0 {
            return Ok(None);
        }

        self.blocking(move |conn| {
            let sql = format!(
                "SELECT {} FROM records WHERE id = ?1 AND exists_flag = 1",
                RECORD_COLUMNS
            );
            let record = conn
                .query_row(&sql, params![id.get() as i64], row_to_record)
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn set_rating_handle(&self, id: RecordId, handle: HandleId) -> Result<()> {
        self.blocking(move |conn| {
            let changed = conn.execute(
                "UPDATE records SET rating_handle = ?1, updated_at = ?2
                 WHERE id = ?3 AND exists_flag = 1",
                params![handle.as_bytes().as_slice(), now_millis(), id.get() as i64],
            )?;
            if changed == 0 {
                return Err(StoreError::RecordNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn set_visible(&self, id: RecordId, visible: bool) -> Result<()> {
        self.blocking(move |conn| {
            let changed = conn.execute(
                "UPDATE records SET visible = ?1, updated_at = ?2
                 WHERE id = ?3 AND exists_flag = 1",
                params![visible, now_millis(), id.get() as i64],
            )?;
            if changed == 0 {
                return Err(StoreError::RecordNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn records_of(&self, owner: &Identity) -> Result<Vec<RecordId>> {
        let owner = *owner;

        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM records WHERE owner = ?1 ORDER BY id ASC")?;
            let ids = stmt
                .query_map(params![owner.as_bytes().as_slice()], |row| {
                    row.get::<_, i64>(0)
                })?
                .map(|r| r.map(|id| RecordId(id as u64)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }
}
