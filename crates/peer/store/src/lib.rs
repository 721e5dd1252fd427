//! Offline reader for a libp2p peerstore address book.
//!
//! A datastore-backed peerstore keeps one record per peer under
//! `/peers/addrs/<base32 peer id>`. This crate turns such a key space back
//! into peers and their addresses:
//!
//! - [`Keyspace`] maps between peer ids and storage keys.
//! - [`AddrBookRecord::decode`] parses a stored value.
//! - [`AddrBook`] enumerates peers, looks them up and assembles reports over
//!   any [`KvBackend`](addrbook_storage::KvBackend).
//!
//! Nothing here writes to the store or logs; undecodable keys and records are
//! handed back to the caller.

mod error;
pub use error::{AddrBookError, QueryOp};

mod keyspace;
pub use keyspace::{ADDR_BOOK_PREFIX, KeyDecodeError, Keyspace, StorageKey};

pub mod proto;

mod reader;
pub use reader::{AddrBook, KeyPolicy, PeerListing};

mod record;
pub use record::{AddrBookRecord, AddrEntry, CertifiedRecord, RecordDecodeError};

mod report;
pub use report::{AddrBookReport, DecodePolicy, PeerReport};
