//! In-memory backend for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{BackendKind, KvBackend, StorageError, StorageResult};

/// A `BTreeMap`-backed store.
///
/// Reports itself as [`BackendKind::Redb`]; the kind only matters for error
/// messages. Reads can be made to fail to exercise error paths, and every
/// point read is counted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    fail_reads: bool,
    gets: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair. Test setup only; not part of [`KvBackend`].
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Make every subsequent scan and get fail with [`StorageError::Read`].
    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Number of point reads served so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::Relaxed)
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail_reads {
            return Err(StorageError::read(self.kind(), "injected read failure"));
        }
        Ok(())
    }
}

impl KvBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Redb
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>> {
        self.check()?;
        Ok(self
            .entries
            .range(prefix.to_vec()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan_is_bounded_and_ordered() {
        let mut store = MemoryBackend::new();
        store.insert(b"/a/2".to_vec(), b"x".to_vec());
        store.insert(b"/a/1".to_vec(), b"x".to_vec());
        store.insert(b"/ab".to_vec(), b"x".to_vec());
        store.insert(b"/b/1".to_vec(), b"x".to_vec());

        let keys = store.keys_with_prefix(b"/a/").unwrap();
        assert_eq!(keys, vec![b"/a/1".to_vec(), b"/a/2".to_vec()]);
    }

    #[test]
    fn test_missing_differs_from_empty() {
        let mut store = MemoryBackend::new();
        store.insert(b"empty".to_vec(), Vec::new());

        assert_eq!(store.get(b"empty").unwrap(), Some(Vec::new()));
        assert_eq!(store.get(b"missing").unwrap(), None);
        assert_eq!(store.get_count(), 2);
    }

    #[test]
    fn test_injected_failure() {
        let store = MemoryBackend::new().fail_reads();
        assert!(matches!(store.keys_with_prefix(b"/"), Err(StorageError::Read { .. })));
        assert!(matches!(store.get(b"/"), Err(StorageError::Read { .. })));
    }
}
