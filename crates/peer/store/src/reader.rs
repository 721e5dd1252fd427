//! Read access to a persisted address book.

use std::collections::BTreeSet;

use addrbook_storage::KvBackend;
use libp2p::PeerId;

use crate::error::QueryOp;
use crate::{AddrBookError, AddrBookRecord, KeyDecodeError, Keyspace, RecordDecodeError};

/// What to do with enumerated keys that do not decode to a peer id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Leave the key out of the peer set and report it in
    /// [`PeerListing::skipped`].
    #[default]
    Skip,
    /// Abort enumeration with [`AddrBookError::Key`].
    Strict,
}

/// Result of enumerating the address book.
#[derive(Debug, Default)]
pub struct PeerListing {
    /// Distinct peers with a stored record, in peer id order.
    pub peers: BTreeSet<PeerId>,
    /// Keys under the prefix that were left out.
    pub skipped: Vec<KeyDecodeError>,
}

/// Reader over the address book region of a datastore.
///
/// Never writes to the backend and keeps no state between calls.
#[derive(Debug)]
pub struct AddrBook<B> {
    backend: B,
    keyspace: Keyspace,
}

impl<B: KvBackend> AddrBook<B> {
    /// Reader using the standard `/peers/addrs` key space.
    pub fn new(backend: B) -> Self {
        Self::with_keyspace(backend, Keyspace::default())
    }

    /// Reader using a custom key space.
    pub fn with_keyspace(backend: B, keyspace: Keyspace) -> Self {
        Self { backend, keyspace }
    }

    /// The backend being read.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The key space records are looked up in.
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// Release the backend.
    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Every distinct peer that has a stored record, empty or not.
    pub fn peers(&self, policy: KeyPolicy) -> Result<PeerListing, AddrBookError> {
        let prefix = self.keyspace.scan_prefix();
        let keys = self
            .backend
            .keys_with_prefix(prefix)
            .map_err(|e| AddrBookError::query(QueryOp::Scan, prefix, e))?;

        let mut listing = PeerListing::default();
        for key in keys {
            match self.keyspace.peer(&key) {
                Ok(peer) => {
                    listing.peers.insert(peer);
                }
                Err(e) if policy == KeyPolicy::Skip => listing.skipped.push(e),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(listing)
    }

    /// The address record of `peer`. A peer without a stored record gets an
    /// empty record.
    pub fn record(&self, peer: &PeerId) -> Result<AddrBookRecord, AddrBookError> {
        self.lookup(peer)?
            .map_err(|source| AddrBookError::Record { peer: *peer, source })
    }

    /// Lookup separating backend failures (outer) from a record that is
    /// present but undecodable (inner).
    pub(crate) fn lookup(
        &self,
        peer: &PeerId,
    ) -> Result<Result<AddrBookRecord, RecordDecodeError>, AddrBookError> {
        let key = self.keyspace.key(peer);
        let value = self
            .backend
            .get(key.as_bytes())
            .map_err(|e| AddrBookError::query(QueryOp::Get, key.as_bytes(), e))?;

        Ok(match value {
            Some(bytes) => AddrBookRecord::decode(*peer, &bytes),
            None => Ok(AddrBookRecord::empty(*peer)),
        })
    }
}
