//! Key-value backend contract for the address book inspector.
//!
//! The inspector never writes. A backend only has to answer two questions:
//!
//! - which keys start with a given prefix ([`KvBackend::keys_with_prefix`])
//! - what value is stored under an exact key ([`KvBackend::get`])
//!
//! A missing key is `Ok(None)`, which is distinct from a present but empty
//! value (`Ok(Some(vec![]))`). Engine adapters live in their own crates
//! (`addrbook-storage-redb`, `addrbook-storage-rocksdb`) so that nothing above
//! this crate depends on engine-specific option types.

use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

mod error;
pub use error::{StorageError, StorageResult};

#[cfg(any(test, feature = "test-utils"))]
mod memory;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryBackend;

/// Embedded key-value engines that can hold a persisted address book.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// redb single-file database.
    #[default]
    Redb,
    /// RocksDB directory.
    Rocksdb,
}

/// How a backend is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    /// Open without taking write access. The only mode the inspector needs.
    #[default]
    ReadOnly,
    /// Regular open. Escape hatch for stores the engine refuses to open
    /// read-only (for example a RocksDB with an unreplayed WAL).
    ReadWrite,
}

impl OpenMode {
    /// Whether this mode avoids write access to the store.
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// An ordered byte-key/byte-value store opened for reading.
///
/// Implementations release the underlying handle on drop.
#[auto_impl(&, Box, Arc)]
pub trait KvBackend: Send + Sync {
    /// The engine behind this handle.
    fn kind(&self) -> BackendKind;

    /// All keys starting with `prefix`, in ascending byte order. Values are
    /// not read.
    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>>;

    /// The value stored under `key`, or `None` if there is no such key.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;
}
