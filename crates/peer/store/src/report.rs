//! Whole-book report assembly.

use addrbook_storage::KvBackend;
use libp2p::PeerId;

use crate::{AddrBook, AddrBookError, AddrBookRecord, KeyDecodeError, KeyPolicy, RecordDecodeError};

/// What to do when one peer's record does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Abort the report with [`AddrBookError::Record`].
    #[default]
    FailFast,
    /// Keep the error on that peer's entry and carry on.
    Annotate,
}

/// One peer's line in a report.
#[derive(Debug)]
pub struct PeerReport {
    pub peer: PeerId,
    pub outcome: Result<AddrBookRecord, RecordDecodeError>,
}

impl PeerReport {
    /// The decoded record, if it decoded.
    pub fn record(&self) -> Option<&AddrBookRecord> {
        self.outcome.as_ref().ok()
    }
}

/// Records for a set of peers, in lookup order.
#[derive(Debug, Default)]
pub struct AddrBookReport {
    pub peers: Vec<PeerReport>,
    /// Keys left out during enumeration.
    pub skipped: Vec<KeyDecodeError>,
}

impl AddrBookReport {
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Number of peers whose record failed to decode.
    pub fn failures(&self) -> usize {
        self.peers.iter().filter(|p| p.outcome.is_err()).count()
    }
}

impl<B: KvBackend> AddrBook<B> {
    /// Enumerate every peer and look each one up.
    ///
    /// Backend failures abort the report regardless of `decode`.
    pub fn report(&self, keys: KeyPolicy, decode: DecodePolicy) -> Result<AddrBookReport, AddrBookError> {
        let listing = self.peers(keys)?;
        let mut report = self.report_peers(listing.peers, decode)?;
        report.skipped = listing.skipped;
        Ok(report)
    }

    /// Look up the given peers without enumerating.
    pub fn report_peers(
        &self,
        peers: impl IntoIterator<Item = PeerId>,
        decode: DecodePolicy,
    ) -> Result<AddrBookReport, AddrBookError> {
        let mut report = AddrBookReport::default();
        for peer in peers {
            let outcome = match (self.lookup(&peer)?, decode) {
                (Err(source), DecodePolicy::FailFast) => {
                    return Err(AddrBookError::Record { peer, source });
                }
                (outcome, _) => outcome,
            };
            report.peers.push(PeerReport { peer, outcome });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_storage::MemoryBackend;
    use assert_matches::assert_matches;

    fn peer(n: u8) -> PeerId {
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&[n; 32]);
        PeerId::from_bytes(&bytes).unwrap()
    }

    fn book(corrupt: &[u8]) -> AddrBook<MemoryBackend> {
        let keyspace = crate::Keyspace::default();
        let mut store = MemoryBackend::new();
        for n in 1..=3 {
            let value = if corrupt.contains(&n) {
                vec![0x0f, 0x01]
            } else {
                AddrBookRecord::empty(peer(n)).encode().unwrap()
            };
            store.insert(keyspace.key(&peer(n)).as_bytes(), value);
        }
        AddrBook::new(store)
    }

    #[test]
    fn test_fail_fast_stops_at_first_bad_record() {
        let book = book(&[2]);
        assert_matches!(
            book.report(KeyPolicy::Skip, DecodePolicy::FailFast),
            Err(AddrBookError::Record { peer: p, .. }) if p == peer(2)
        );
    }

    #[test]
    fn test_annotate_keeps_going() {
        let book = book(&[1, 3]);
        let report = book.report(KeyPolicy::Skip, DecodePolicy::Annotate).unwrap();

        assert_eq!(report.peers.len(), 3);
        assert_eq!(report.failures(), 2);
        let ok: Vec<_> = report.peers.iter().filter_map(PeerReport::record).map(|r| r.peer).collect();
        assert_eq!(ok, vec![peer(2)]);
    }

    #[test]
    fn test_report_peers_skips_enumeration() {
        let book = book(&[]);
        let report = book.report_peers([peer(3), peer(200)], DecodePolicy::FailFast).unwrap();

        assert_eq!(book.backend().get_count(), 2);
        assert_eq!(report.peers.len(), 2);
        assert_eq!(report.peers[1].peer, peer(200));
        assert!(report.peers[1].record().unwrap().is_empty());
    }

    #[test]
    fn test_backend_failure_aborts_even_when_annotating() {
        let book = AddrBook::new(MemoryBackend::new().fail_reads());
        assert_matches!(
            book.report_peers([peer(1)], DecodePolicy::Annotate),
            Err(AddrBookError::Query { .. })
        );
    }
}
