//! redb backend for the address book inspector.
//!
//! The datastore is a single redb table, [`DATASTORE_TABLE`], holding the flat
//! byte key space. A database without that table is treated as an empty store.
//! When pointed at a directory, the adapter opens [`DATASTORE_FILE`] inside it.

use std::path::{Path, PathBuf};

use addrbook_storage::{BackendKind, KvBackend, OpenMode, StorageError, StorageResult};
use redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition, TableError};
use tracing::debug;

/// Table holding the datastore key space.
/// Key: raw datastore key bytes
/// Value: raw record bytes
pub const DATASTORE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("datastore");

/// File name looked up when the datastore path is a directory.
pub const DATASTORE_FILE: &str = "datastore.redb";

const KIND: BackendKind = BackendKind::Redb;

/// redb-backed datastore handle.
///
/// The file lock is held until the handle is dropped.
pub struct RedbBackend {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend").field("path", &self.path).finish()
    }
}

impl RedbBackend {
    /// Open an existing database file. Never creates one.
    ///
    /// redb 2 has no read-only handle, so [`OpenMode::ReadOnly`] is advisory:
    /// this adapter only ever starts read transactions, but `Database::open`
    /// itself may write to the file to repair it if it was not closed
    /// cleanly. Both modes behave the same at open time. Copy the file first
    /// when it must stay untouched.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> StorageResult<Self> {
        let path = resolve(path.as_ref());
        let db = Database::open(&path).map_err(|e| StorageError::open(KIND, &path, e))?;

        debug!(path = %path.display(), ?mode, "Opened redb datastore");
        Ok(Self { db, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the datastore table in a fresh read transaction. `None` if the
    /// table was never created.
    fn table(&self) -> StorageResult<Option<ReadOnlyTable<&'static [u8], &'static [u8]>>> {
        let read_txn = self.db.begin_read().map_err(|e| StorageError::read(KIND, e))?;
        match read_txn.open_table(DATASTORE_TABLE) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(StorageError::read(KIND, e)),
        }
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_dir() { path.join(DATASTORE_FILE) } else { path.to_path_buf() }
}

impl KvBackend for RedbBackend {
    fn kind(&self) -> BackendKind {
        KIND
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>> {
        let Some(table) = self.table()? else {
            return Ok(Vec::new());
        };

        let mut keys = Vec::new();
        for entry in table.range(prefix..).map_err(|e| StorageError::read(KIND, e))? {
            let (key, _) = entry.map_err(|e| StorageError::read(KIND, e))?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_vec());
        }

        Ok(keys)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let Some(table) = self.table()? else {
            return Ok(None);
        };

        match table.get(key).map_err(|e| StorageError::read(KIND, e))? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }
}
