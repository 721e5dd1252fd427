//! Decoded address book records.

use libp2p::identity::ParseError;
use libp2p::{Multiaddr, PeerId, multiaddr};

use crate::proto;

/// Error decoding a stored address book record.
///
/// Any failure rejects the whole record: a value that is partly unreadable
/// cannot be trusted for the entries that did parse.
#[derive(Debug, thiserror::Error)]
pub enum RecordDecodeError {
    /// The value is not a well-formed record (truncated, wrong wire types).
    #[error("malformed record payload: {0}")]
    Protobuf(#[from] quick_protobuf::Error),
    /// The record's embedded id is not a peer id.
    #[error("record id is not a valid peer id: {source}")]
    InvalidPeerId { source: ParseError },
    /// An entry carries no address bytes.
    #[error("address entry {index} has no address")]
    MissingAddress { index: usize },
    /// An entry's address bytes are not a multiaddr.
    #[error("address entry {index} is not a valid multiaddr: {source}")]
    InvalidAddress {
        index: usize,
        source: multiaddr::Error,
    },
}

/// One known address of a peer.
///
/// `ttl` and `expiry` are taken verbatim from the store; no relation between
/// them is enforced and already-expired entries are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrEntry {
    /// The address.
    pub addr: Multiaddr,
    /// Original time-to-live, in nanoseconds.
    pub ttl: i64,
    /// Absolute expiry, in Unix seconds.
    pub expiry: i64,
}

impl AddrEntry {
    pub fn new(addr: Multiaddr, ttl: i64, expiry: i64) -> Self {
        Self { addr, ttl, expiry }
    }

    /// Whether the entry has expired at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry <= now
    }
}

impl TryFrom<(usize, proto::AddrEntry)> for AddrEntry {
    type Error = RecordDecodeError;

    fn try_from((index, entry): (usize, proto::AddrEntry)) -> Result<Self, Self::Error> {
        if entry.addr.is_empty() {
            return Err(RecordDecodeError::MissingAddress { index });
        }
        let addr = Multiaddr::try_from(entry.addr)
            .map_err(|source| RecordDecodeError::InvalidAddress { index, source })?;

        Ok(Self::new(addr, entry.ttl, entry.expiry))
    }
}

impl From<&AddrEntry> for proto::AddrEntry {
    fn from(entry: &AddrEntry) -> Self {
        Self {
            addr: entry.addr.to_vec(),
            expiry: entry.expiry,
            ttl: entry.ttl,
        }
    }
}

/// Summary of the signed peer record stored alongside the addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifiedRecord {
    /// Sequence number of the signed record.
    pub seq: u64,
    /// Serialized signed envelope, unverified.
    pub envelope: Vec<u8>,
}

impl From<proto::CertifiedRecord> for CertifiedRecord {
    fn from(record: proto::CertifiedRecord) -> Self {
        Self {
            seq: record.seq,
            envelope: record.raw,
        }
    }
}

/// Everything the address book knows about one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrBookRecord {
    /// The peer this record was looked up for.
    pub peer: PeerId,
    /// Addresses in stored order.
    pub entries: Vec<AddrEntry>,
    /// Latest signed peer record, if one was stored.
    pub certified: Option<CertifiedRecord>,
}

impl AddrBookRecord {
    /// A record with no addresses, for peers the store knows nothing about.
    pub fn empty(peer: PeerId) -> Self {
        Self {
            peer,
            entries: Vec::new(),
            certified: None,
        }
    }

    /// Decode a stored value for `peer`.
    ///
    /// A non-empty embedded id must be a valid peer id, but it is not
    /// compared with `peer`.
    pub fn decode(peer: PeerId, bytes: &[u8]) -> Result<Self, RecordDecodeError> {
        let record = proto::AddrBookRecord::from_bytes(bytes)?;

        if !record.id.is_empty() {
            PeerId::from_bytes(&record.id).map_err(|source| RecordDecodeError::InvalidPeerId { source })?;
        }

        let entries = record
            .addrs
            .into_iter()
            .enumerate()
            .map(AddrEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            peer,
            entries,
            certified: record.certified_record.map(Into::into),
        })
    }

    /// Encode in the stored layout.
    pub fn encode(&self) -> Result<Vec<u8>, quick_protobuf::Error> {
        proto::AddrBookRecord {
            id: self.peer.to_bytes(),
            addrs: self.entries.iter().map(Into::into).collect(),
            certified_record: self.certified.as_ref().map(|c| proto::CertifiedRecord {
                seq: c.seq,
                raw: c.envelope.clone(),
            }),
        }
        .to_bytes()
    }

    /// Number of address entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no address entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
