//! RocksDB backend for the address book inspector.
//!
//! The flat datastore key space lives in the default column family.

use std::path::{Path, PathBuf};

use addrbook_storage::{BackendKind, KvBackend, OpenMode, StorageError, StorageResult};
use rocksdb::{DB, Options};
use tracing::debug;

const KIND: BackendKind = BackendKind::Rocksdb;

/// RocksDB-backed datastore handle. The database is closed on drop.
pub struct RocksDbBackend {
    db: DB,
    path: PathBuf,
}

impl std::fmt::Debug for RocksDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbBackend").field("path", &self.path).finish()
    }
}

impl RocksDbBackend {
    /// Open an existing database directory. Never creates one.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> StorageResult<Self> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(false);

        let db = match mode {
            OpenMode::ReadOnly => DB::open_for_read_only(&opts, path, false),
            OpenMode::ReadWrite => DB::open(&opts, path),
        }
        .map_err(|e| StorageError::open(KIND, path, e))?;

        debug!(path = %path.display(), ?mode, "Opened RocksDB datastore");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Path of the database directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvBackend for RocksDbBackend {
    fn kind(&self) -> BackendKind {
        KIND
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>> {
        let mut iter = self.db.raw_iterator();
        iter.seek(prefix);

        let mut keys = Vec::new();
        while iter.valid() {
            match iter.key() {
                Some(key) if key.starts_with(prefix) => keys.push(key.to_vec()),
                _ => break,
            }
            iter.next();
        }
        iter.status().map_err(|e| StorageError::read(KIND, e))?;

        Ok(keys)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(key).map_err(|e| StorageError::read(KIND, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed(path: &Path, entries: &[(&str, &str)]) {
        let db = DB::open_default(path).unwrap();
        for (key, value) in entries {
            db.put(key.as_bytes(), value.as_bytes()).unwrap();
        }
        db.flush().unwrap();
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        for mode in [OpenMode::ReadOnly, OpenMode::ReadWrite] {
            let result = RocksDbBackend::open(&missing, mode);
            assert!(matches!(result, Err(StorageError::Open { kind: BackendKind::Rocksdb, .. })));
        }
        assert!(!missing.exists());
    }

    #[test]
    fn test_prefix_scan() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &[
                ("/peers/addrs/B", "2"),
                ("/peers/addrs/A", "1"),
                ("/peers/addrsX", "x"),
                ("/peers/keys/A", "k"),
            ],
        );

        let store = RocksDbBackend::open(dir.path(), OpenMode::ReadOnly).unwrap();
        let keys = store.keys_with_prefix(b"/peers/addrs/").unwrap();
        assert_eq!(keys, vec![b"/peers/addrs/A".to_vec(), b"/peers/addrs/B".to_vec()]);
    }

    #[test]
    fn test_get_found_empty_and_missing() {
        let dir = tempdir().unwrap();
        seed(dir.path(), &[("full", "value"), ("empty", "")]);

        for mode in [OpenMode::ReadOnly, OpenMode::ReadWrite] {
            let store = RocksDbBackend::open(dir.path(), mode).unwrap();
            assert_eq!(store.get(b"full").unwrap(), Some(b"value".to_vec()));
            assert_eq!(store.get(b"empty").unwrap(), Some(Vec::new()));
            assert_eq!(store.get(b"missing").unwrap(), None);
        }
    }
}
