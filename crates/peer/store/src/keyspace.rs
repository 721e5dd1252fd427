//! Mapping between peer ids and datastore keys.
//!
//! A record for peer `p` lives under `<prefix>/<base32 of p's bytes>`, using
//! the RFC 4648 alphabet without padding.

use std::fmt;

use data_encoding::BASE32_NOPAD;
use libp2p::PeerId;
use libp2p::identity::ParseError;

/// Prefix the libp2p datastore-backed peerstore keeps address records under.
pub const ADDR_BOOK_PREFIX: &str = "/peers/addrs";

/// Error decoding a datastore key back into a peer id.
#[derive(Debug, thiserror::Error)]
pub enum KeyDecodeError {
    /// The key is not below the address book prefix.
    #[error("key {key} is outside the address book key space")]
    OutsidePrefix { key: String },
    /// The last path segment is not unpadded base32.
    #[error("key {key} does not end in unpadded base32: {source}")]
    InvalidBase32 {
        key: String,
        source: data_encoding::DecodeError,
    },
    /// The decoded bytes are not a peer id.
    #[error("key {key} does not name a valid peer id: {source}")]
    InvalidPeerId { key: String, source: ParseError },
}

impl KeyDecodeError {
    /// The offending key, lossily rendered as text.
    pub fn key(&self) -> &str {
        match self {
            Self::OutsidePrefix { key }
            | Self::InvalidBase32 { key, .. }
            | Self::InvalidPeerId { key, .. } => key,
        }
    }
}

/// A datastore key naming one peer's address record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// The key as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as stored in the backend.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The address book's region of the datastore key space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    /// Scan prefix, always ending in `/`.
    scan_prefix: String,
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new(ADDR_BOOK_PREFIX)
    }
}

impl Keyspace {
    /// Key space rooted at `prefix`. Trailing slashes are ignored.
    pub fn new(prefix: &str) -> Self {
        Self {
            scan_prefix: format!("{}/", prefix.trim_end_matches('/')),
        }
    }

    /// The prefix without its trailing slash.
    pub fn prefix(&self) -> &str {
        self.scan_prefix.strip_suffix('/').unwrap_or(&self.scan_prefix)
    }

    /// Bytes every address record key starts with.
    ///
    /// Includes the separator so that sibling namespaces sharing a textual
    /// prefix (`/peers/addrsX`) are not scanned.
    pub fn scan_prefix(&self) -> &[u8] {
        self.scan_prefix.as_bytes()
    }

    /// Key holding `peer`'s address record.
    pub fn key(&self, peer: &PeerId) -> StorageKey {
        StorageKey(format!("{}{}", self.scan_prefix, BASE32_NOPAD.encode(&peer.to_bytes())))
    }

    /// Recover the peer id from a key under this key space.
    ///
    /// Only the last path segment is decoded.
    pub fn peer(&self, key: &[u8]) -> Result<PeerId, KeyDecodeError> {
        let text = || String::from_utf8_lossy(key).into_owned();

        if !key.starts_with(self.scan_prefix()) {
            return Err(KeyDecodeError::OutsidePrefix { key: text() });
        }

        let segment = match key.iter().rposition(|b| *b == b'/') {
            Some(pos) => key.get(pos + 1..).unwrap_or_default(),
            None => key,
        };

        let bytes = BASE32_NOPAD
            .decode(segment)
            .map_err(|source| KeyDecodeError::InvalidBase32 { key: text(), source })?;

        PeerId::from_bytes(&bytes).map_err(|source| KeyDecodeError::InvalidPeerId { key: text(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn sha256_peer(digest: [u8; 32]) -> PeerId {
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&digest);
        PeerId::from_bytes(&bytes).unwrap()
    }

    fn inline_peer(key: &[u8]) -> PeerId {
        let mut bytes = vec![0x00, key.len() as u8];
        bytes.extend_from_slice(key);
        PeerId::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_key_layout() {
        let peer = sha256_peer([0u8; 32]);
        let key = Keyspace::default().key(&peer);

        let expected = format!("/peers/addrs/{}", BASE32_NOPAD.encode(&peer.to_bytes()));
        assert_eq!(key.as_str(), expected);
        assert!(!key.as_str().contains('='));
        assert!(key.as_str().starts_with("/peers/addrs/CIQA"));
    }

    #[test]
    fn test_prefix_normalisation() {
        let keyspace = Keyspace::new("/custom/book/");
        assert_eq!(keyspace.prefix(), "/custom/book");
        assert_eq!(keyspace.scan_prefix(), b"/custom/book/");
        assert_eq!(Keyspace::default().prefix(), ADDR_BOOK_PREFIX);
    }

    #[test]
    fn test_outside_prefix() {
        let keyspace = Keyspace::default();
        assert_matches!(
            keyspace.peer(b"/peers/keys/CIQAAAAA"),
            Err(KeyDecodeError::OutsidePrefix { .. })
        );
        assert_matches!(
            keyspace.peer(b"/peers/addrsCIQAAAAA"),
            Err(KeyDecodeError::OutsidePrefix { .. })
        );
    }

    #[test]
    fn test_padding_is_rejected() {
        let keyspace = Keyspace::default();
        let peer = sha256_peer([7u8; 32]);
        let padded = format!("{}====", keyspace.key(&peer));

        assert_matches!(
            keyspace.peer(padded.as_bytes()),
            Err(KeyDecodeError::InvalidBase32 { .. })
        );
    }

    #[test]
    fn test_invalid_base32() {
        let err = Keyspace::default().peer(b"/peers/addrs/not-base32!").unwrap_err();
        assert_matches!(err, KeyDecodeError::InvalidBase32 { .. });
        assert_eq!(err.key(), "/peers/addrs/not-base32!");
    }

    #[test]
    fn test_bytes_that_are_not_a_peer_id() {
        let key = format!("/peers/addrs/{}", BASE32_NOPAD.encode(&[0xff, 0xff]));
        assert_matches!(
            Keyspace::default().peer(key.as_bytes()),
            Err(KeyDecodeError::InvalidPeerId { .. })
        );
    }

    #[test]
    fn test_last_segment_is_decoded() {
        let keyspace = Keyspace::default();
        let peer = sha256_peer([3u8; 32]);
        let nested = format!("/peers/addrs/extra/{}", BASE32_NOPAD.encode(&peer.to_bytes()));

        assert_eq!(keyspace.peer(nested.as_bytes()).unwrap(), peer);
    }

    proptest! {
        #[test]
        fn test_sha256_peer_roundtrip(digest in any::<[u8; 32]>()) {
            let keyspace = Keyspace::default();
            let peer = sha256_peer(digest);
            let key = keyspace.key(&peer);
            prop_assert_eq!(keyspace.peer(key.as_bytes()).unwrap(), peer);
        }

        #[test]
        fn test_inline_peer_roundtrip(key in proptest::collection::vec(any::<u8>(), 0..=42)) {
            let keyspace = Keyspace::new("/other/prefix");
            let peer = inline_peer(&key);
            let storage_key = keyspace.key(&peer);
            prop_assert_eq!(keyspace.peer(storage_key.as_bytes()).unwrap(), peer);
        }

        #[test]
        fn test_distinct_peers_get_distinct_keys(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            prop_assume!(a != b);
            let keyspace = Keyspace::default();
            prop_assert_ne!(keyspace.key(&sha256_peer(a)), keyspace.key(&sha256_peer(b)));
        }
    }
}
