//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`ADDRBOOK_` prefix)
//! 4. Defaults

use std::path::{Path, PathBuf};

use addrbook_peer_store::{DecodePolicy, KeyPolicy};
use addrbook_storage::{BackendKind, OpenMode};
use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::args::InspectArgs;
use crate::render::OutputFormat;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "ADDRBOOK_";

/// Resolved inspector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Key-value engine holding the datastore.
    pub backend: BackendKind,

    /// Datastore location.
    pub path: PathBuf,

    /// Open with write access.
    pub unsafe_open: bool,

    /// Annotate undecodable records instead of aborting.
    pub keep_going: bool,

    /// Abort on keys that do not name a peer.
    pub strict_keys: bool,

    /// Report format.
    pub format: OutputFormat,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: PathBuf::from("."),
            unsafe_open: false,
            keep_going: false,
            strict_keys: false,
            format: OutputFormat::default(),
        }
    }
}

impl InspectConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            } else {
                warn!(path = %path.display(), "Config file not found, ignoring");
            }
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Override with whatever was given on the command line.
    pub fn apply_args(&mut self, args: &InspectArgs) {
        if let Some(backend) = args.backend {
            self.backend = backend;
        }
        if let Some(path) = &args.path {
            self.path = path.clone();
        }
        if let Some(format) = args.format {
            self.format = format;
        }
        self.unsafe_open |= args.unsafe_open;
        self.keep_going |= args.keep_going;
        self.strict_keys |= args.strict_keys;
    }

    pub fn open_mode(&self) -> OpenMode {
        if self.unsafe_open { OpenMode::ReadWrite } else { OpenMode::ReadOnly }
    }

    pub fn key_policy(&self) -> KeyPolicy {
        if self.strict_keys { KeyPolicy::Strict } else { KeyPolicy::Skip }
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        if self.keep_going { DecodePolicy::Annotate } else { DecodePolicy::FailFast }
    }
}
