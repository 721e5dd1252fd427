//! Backend selection.

use std::path::Path;

use addrbook_storage::{BackendKind, KvBackend, OpenMode, StorageError};
use addrbook_storage_redb::RedbBackend;
use addrbook_storage_rocksdb::RocksDbBackend;

/// Open the datastore at `path` with the chosen engine.
pub fn open_backend(kind: BackendKind, path: &Path, mode: OpenMode) -> Result<Box<dyn KvBackend>, StorageError> {
    Ok(match kind {
        BackendKind::Redb => Box::new(RedbBackend::open(path, mode)?),
        BackendKind::Rocksdb => Box::new(RocksDbBackend::open(path, mode)?),
    })
}
