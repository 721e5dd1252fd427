//! Report rendering.

use std::io::{self, Write};

use addrbook_peer_store::{AddrBookRecord, AddrBookReport, AddrEntry};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout for expiries, in local time.
const EXPIRY_FORMAT: &str = "%H:%M:%S %Y/%m/%d";

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Numbered, human readable listing.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Write `report` in the given format.
pub fn render(report: &AddrBookReport, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(report, out),
        OutputFormat::Json => render_json(report, Utc::now().timestamp(), out),
    }
}

/// Numbered listing, one block per peer.
pub fn render_text(report: &AddrBookReport, out: &mut impl Write) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "No peer information found");
    }

    writeln!(out, "Found {} unique peers\n", report.peers.len())?;

    for (i, peer) in report.peers.iter().enumerate() {
        let n = i + 1;
        match &peer.outcome {
            Ok(record) => {
                writeln!(out, "{n}. {} - found {} address(es):", peer.peer, record.len())?;
                for entry in &record.entries {
                    writeln!(
                        out,
                        "    * [{}], TTL: {}, expires at: {} ({})",
                        entry.addr,
                        entry.ttl,
                        entry.expiry,
                        local_time(entry.expiry)
                    )?;
                }
                if let Some(certified) = &record.certified {
                    writeln!(
                        out,
                        "    certified record: seq {} ({} bytes)",
                        certified.seq,
                        certified.envelope.len()
                    )?;
                }
            }
            Err(err) => {
                writeln!(out, "{n}. {} - failed to decode address book record: {err}", peer.peer)?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

fn local_time(unix: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix, 0) {
        Some(utc) => utc.with_timezone(&Local).format(EXPIRY_FORMAT).to_string(),
        None => "out of range".to_owned(),
    }
}

#[derive(Serialize)]
struct JsonReport {
    peers: Vec<JsonPeer>,
    skipped_keys: usize,
}

#[derive(Serialize)]
struct JsonPeer {
    peer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    addrs: Option<Vec<JsonAddr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    certified: Option<JsonCertified>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JsonAddr {
    addr: String,
    ttl: i64,
    expiry: i64,
    expired: bool,
}

#[derive(Serialize)]
struct JsonCertified {
    seq: u64,
    size: usize,
}

impl JsonPeer {
    fn decoded(record: &AddrBookRecord, now: i64) -> Self {
        Self {
            peer: record.peer.to_string(),
            addrs: Some(record.entries.iter().map(|e| JsonAddr::new(e, now)).collect()),
            certified: record.certified.as_ref().map(|c| JsonCertified {
                seq: c.seq,
                size: c.envelope.len(),
            }),
            error: None,
        }
    }
}

impl JsonAddr {
    fn new(entry: &AddrEntry, now: i64) -> Self {
        Self {
            addr: entry.addr.to_string(),
            ttl: entry.ttl,
            expiry: entry.expiry,
            expired: entry.is_expired_at(now),
        }
    }
}

/// One JSON document. `now` (Unix seconds) decides the `expired` flags.
pub fn render_json(report: &AddrBookReport, now: i64, out: &mut impl Write) -> io::Result<()> {
    let doc = JsonReport {
        peers: report
            .peers
            .iter()
            .map(|p| match &p.outcome {
                Ok(record) => JsonPeer::decoded(record, now),
                Err(err) => JsonPeer {
                    peer: p.peer.to_string(),
                    addrs: None,
                    certified: None,
                    error: Some(err.to_string()),
                },
            })
            .collect(),
        skipped_keys: report.skipped.len(),
    };

    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)
}
