//! Command line front end of the address book inspector.
//!
//! - [`Cli`] - argument parser
//! - [`InspectConfig`] - resolved configuration
//! - [`render`] - text and JSON reports
//!
//! Configuration is loaded using Figment with the following priority
//! (highest wins):
//!
//! 1. CLI arguments
//! 2. Config file (TOML)
//! 3. Environment variables (`ADDRBOOK_` prefix)
//! 4. Defaults

mod args;
pub mod backend;
pub mod config;
pub mod logging;
pub mod render;

pub use args::{Cli, InspectArgs, LogArgs};
pub use config::InspectConfig;

use std::io::{self, Write};

use addrbook_peer_store::{AddrBook, AddrBookReport};
use addrbook_storage::KvBackend;
use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use libp2p::PeerId;
use tracing::{debug, info, warn};

/// Run the inspector with the process arguments.
///
/// This is the main entry point that should be called from the binary.
pub fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.logs)?;

    let mut config = InspectConfig::load(cli.inspect.config.as_deref())?;
    config.apply_args(&cli.inspect);
    debug!(?config, "Resolved configuration");

    let mode = config.open_mode();
    if !mode.is_read_only() {
        warn!(path = %config.path.display(), "Opening datastore with write access");
    }
    let backend = backend::open_backend(config.backend, &config.path, mode).wrap_err("init datastore")?;

    let book = AddrBook::new(backend);
    let report = inspect(&book, &config, cli.inspect.peer)?;

    let mut out = io::stdout().lock();
    render::render(&report, config.format, &mut out)?;
    out.flush()?;

    Ok(())
}

/// Build the report for one peer, or for every peer when `peer` is `None`.
///
/// Keys skipped during enumeration are logged here.
pub fn inspect<B: KvBackend>(
    book: &AddrBook<B>,
    config: &InspectConfig,
    peer: Option<PeerId>,
) -> eyre::Result<AddrBookReport> {
    let report = match peer {
        Some(peer) => book
            .report_peers([peer], config.decode_policy())
            .wrap_err_with(|| format!("loading addresses for {peer}"))?,
        None => book
            .report(config.key_policy(), config.decode_policy())
            .wrap_err("loading peers from datastore")?,
    };

    for skipped in &report.skipped {
        warn!(key = skipped.key(), error = %skipped, "Skipping key outside the peer id format");
    }
    if !report.skipped.is_empty() {
        info!(count = report.skipped.len(), "Skipped undecodable keys");
    }
    if report.failures() > 0 {
        warn!(count = report.failures(), "Some address book records could not be decoded");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_peer_store::{AddrBookRecord, AddrEntry, Keyspace};
    use addrbook_storage::{MemoryBackend, OpenMode};
    use libp2p::Multiaddr;

    fn peer(n: u8) -> PeerId {
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&[n; 32]);
        PeerId::from_bytes(&bytes).unwrap()
    }

    fn book() -> AddrBook<MemoryBackend> {
        let keyspace = Keyspace::default();
        let mut store = MemoryBackend::new();

        let mut good = AddrBookRecord::empty(peer(1));
        good.entries
            .push(AddrEntry::new("/ip4/127.0.0.1/tcp/4001".parse::<Multiaddr>().unwrap(), 300, 1_700_000_000));
        store.insert(keyspace.key(&peer(1)).as_bytes(), good.encode().unwrap());
        store.insert(keyspace.key(&peer(2)).as_bytes(), vec![0x0f, 0x01]);
        store.insert(b"/peers/addrs/junk!".to_vec(), Vec::new());

        AddrBook::new(store)
    }

    #[test]
    fn test_fail_fast_by_default() {
        let err = inspect(&book(), &InspectConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains("loading peers from datastore"));
    }

    #[test]
    fn test_keep_going_reports_everything() {
        let config = InspectConfig {
            keep_going: true,
            ..Default::default()
        };

        let report = inspect(&book(), &config, None).unwrap();
        assert_eq!(report.peers.len(), 2);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_strict_keys_abort() {
        let config = InspectConfig {
            keep_going: true,
            strict_keys: true,
            ..Default::default()
        };
        assert!(inspect(&book(), &config, None).is_err());
    }

    #[test]
    fn test_single_peer() {
        let book = book();
        let report = inspect(&book, &InspectConfig::default(), Some(peer(1))).unwrap();
        assert_eq!(report.peers.len(), 1);
        assert_eq!(report.peers[0].record().unwrap().len(), 1);
        assert_eq!(book.backend().get_count(), 1);

        let unknown = inspect(&book, &InspectConfig::default(), Some(peer(9))).unwrap();
        assert!(unknown.peers[0].record().unwrap().is_empty());
    }

    #[test]
    fn test_redb_datastore_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peers.redb");
        let record = AddrBookRecord {
            peer: peer(7),
            entries: vec![AddrEntry::new("/ip6/::1/tcp/1634".parse::<Multiaddr>().unwrap(), 0, 0)],
            certified: None,
        };

        let db = redb::Database::create(&path).unwrap();
        let write_txn = db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(addrbook_storage_redb::DATASTORE_TABLE).unwrap();
            let key = Keyspace::default().key(&record.peer);
            table.insert(key.as_bytes(), record.encode().unwrap().as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
        drop(db);

        let backend = backend::open_backend(addrbook_storage::BackendKind::Redb, &path, OpenMode::ReadOnly).unwrap();
        let report = inspect(&AddrBook::new(backend), &InspectConfig::default(), None).unwrap();

        let mut out = Vec::new();
        render::render_text(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Found 1 unique peers\n\n1. "));
        assert!(text.contains("* [/ip6/::1/tcp/1634], TTL: 0, expires at: 0 ("));
    }
}
