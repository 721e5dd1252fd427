//! Command line arguments.

use std::path::PathBuf;

use addrbook_storage::BackendKind;
use clap::{Args, Parser};
use libp2p::PeerId;

use crate::render::OutputFormat;

/// Print the peers and addresses stored in a libp2p peerstore datastore.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub logs: LogArgs,

    /// Datastore and report options.
    #[command(flatten)]
    pub inspect: InspectArgs,
}

/// Logging configuration.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Logging")]
pub struct LogArgs {
    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Log filter directive (e.g., "addrbook_cli=debug").
    #[arg(long = "log.filter", value_name = "DIRECTIVE")]
    pub filter: Option<String>,

    /// Use JSON format for log output.
    #[arg(long = "log.json")]
    pub json: bool,
}

/// Datastore and report options.
///
/// Every option here overrides the config file and environment when given.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Datastore")]
pub struct InspectArgs {
    /// Key-value engine holding the datastore.
    #[arg(short, long, value_name = "KIND")]
    pub backend: Option<BackendKind>,

    /// Datastore location.
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Open the datastore with write access, for stores that refuse a
    /// read-only open.
    #[arg(long)]
    pub unsafe_open: bool,

    /// Report records that fail to decode instead of aborting.
    #[arg(long)]
    pub keep_going: bool,

    /// Abort on keys under the address book prefix that do not name a peer.
    #[arg(long)]
    pub strict_keys: bool,

    /// Only report this peer (base58).
    #[arg(long, value_name = "PEER_ID")]
    pub peer: Option<PeerId>,

    /// Report format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// TOML config file.
    #[arg(long, value_name = "PATH", env = "ADDRBOOK_CONFIG")]
    pub config: Option<PathBuf>,
}
