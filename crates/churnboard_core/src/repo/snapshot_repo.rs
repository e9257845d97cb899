//! Snapshot storage contracts and backends.
//!
//! # Responsibility
//! - Provide string-keyed read/write/remove over local persistent storage.
//! - Offer an in-process backend for tests and disk-less callers.
//!
//! # Invariants
//! - `write_snapshot` replaces the whole value stored under a key.
//! - Reading an absent key returns `Ok(None)`, never an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of the underlying storage medium.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    /// Backend refused access (quota, permissions, closed handle).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage table `{table}` is missing; run migrations first")
            }
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value storage the session store is mirrored into.
pub trait SnapshotStorage {
    /// Reads the value stored under `key`.
    fn read_snapshot(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn write_snapshot(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes `key`. Removing an absent key succeeds.
    fn remove_snapshot(&self, key: &str) -> StorageResult<()>;
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for &S {
    fn read_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read_snapshot(key)
    }

    fn write_snapshot(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write_snapshot(key, value)
    }

    fn remove_snapshot(&self, key: &str) -> StorageResult<()> {
        (**self).remove_snapshot(key)
    }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for Box<S> {
    fn read_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read_snapshot(key)
    }

    fn write_snapshot(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write_snapshot(key, value)
    }

    fn remove_snapshot(&self, key: &str) -> StorageResult<()> {
        (**self).remove_snapshot(key)
    }
}

/// SQLite-backed snapshot storage.
pub struct SqliteSnapshotStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotStorage<'conn> {
    /// Constructs storage from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        if !table_exists(conn, "snapshots")? {
            return Err(StorageError::MissingRequiredTable("snapshots"));
        }
        Ok(Self { conn })
    }
}

impl SnapshotStorage for SqliteSnapshotStorage<'_> {
    fn read_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_snapshot(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO snapshots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_snapshot(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// In-process snapshot storage.
///
/// Single-threaded; values live as long as the instance.
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one raw value, e.g. a hand-written or corrupt blob in tests.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.into(), value.into());
        storage
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn read_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write_snapshot(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_snapshot(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stand-in used when the storage medium could not be opened.
///
/// Every call fails with `StorageError::Unavailable`, so the note persister
/// degrades to seed data and in-memory edits.
#[derive(Debug, Clone)]
pub struct UnavailableSnapshotStorage {
    reason: String,
}

impl UnavailableSnapshotStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SnapshotStorage for UnavailableSnapshotStorage {
    fn read_snapshot(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn write_snapshot(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn remove_snapshot(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{
        MemorySnapshotStorage, SnapshotStorage, SqliteSnapshotStorage, StorageError,
        UnavailableSnapshotStorage,
    };
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn sqlite_storage_upserts_and_removes() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteSnapshotStorage::try_new(&conn).unwrap();

        assert_eq!(storage.read_snapshot("k").unwrap(), None);
        storage.write_snapshot("k", "[1]").unwrap();
        storage.write_snapshot("k", "[2]").unwrap();
        assert_eq!(storage.read_snapshot("k").unwrap().as_deref(), Some("[2]"));

        storage.remove_snapshot("k").unwrap();
        storage.remove_snapshot("k").unwrap();
        assert_eq!(storage.read_snapshot("k").unwrap(), None);
    }

    #[test]
    fn sqlite_storage_requires_migrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteSnapshotStorage::try_new(&conn);
        assert!(matches!(
            result,
            Err(StorageError::MissingRequiredTable("snapshots"))
        ));
    }

    #[test]
    fn unavailable_storage_fails_every_call_with_reason() {
        let storage: Box<dyn SnapshotStorage> =
            Box::new(UnavailableSnapshotStorage::new("disk detached"));
        let err = storage.read_snapshot("k").unwrap_err();
        assert!(err.to_string().contains("disk detached"));
        assert!(storage.write_snapshot("k", "[]").is_err());
        assert!(storage.remove_snapshot("k").is_err());
    }

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemorySnapshotStorage::with_entry("a", "1");
        assert_eq!(storage.read_snapshot("a").unwrap().as_deref(), Some("1"));
        storage.write_snapshot("a", "2").unwrap();
        assert_eq!(storage.read_snapshot("a").unwrap().as_deref(), Some("2"));
        storage.remove_snapshot("a").unwrap();
        assert_eq!(storage.read_snapshot("a").unwrap(), None);
    }
}
