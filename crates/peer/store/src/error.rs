//! Address book reader errors.

use addrbook_storage::StorageError;
use libp2p::PeerId;

use crate::{KeyDecodeError, RecordDecodeError};

/// Backend operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryOp {
    /// Key-only prefix scan.
    Scan,
    /// Point lookup.
    Get,
}

/// Errors returned by [`AddrBook`](crate::AddrBook).
#[derive(Debug, thiserror::Error)]
pub enum AddrBookError {
    /// The backend failed a scan or lookup. `key` is the scanned prefix or
    /// the looked-up key.
    #[error("{op} of {key} failed: {source}")]
    Query {
        op: QueryOp,
        key: String,
        source: StorageError,
    },
    /// A stored record for `peer` could not be decoded.
    #[error("decoding address book record for {peer}: {source}")]
    Record {
        peer: PeerId,
        source: RecordDecodeError,
    },
    /// An enumerated key did not decode, with [`KeyPolicy::Strict`](crate::KeyPolicy::Strict).
    #[error(transparent)]
    Key(#[from] KeyDecodeError),
}

impl AddrBookError {
    pub(crate) fn query(op: QueryOp, key: &[u8], source: StorageError) -> Self {
        Self::Query {
            op,
            key: String::from_utf8_lossy(key).into_owned(),
            source,
        }
    }
}
