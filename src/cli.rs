//! CLI definition using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::server::{DEFAULT_ADDRESS, ServerSettings, Transport, parse_address};

/// xfn - KMS crypto keys for encryption-key composites
#[derive(Parser, Debug)]
#[command(name = "xfn")]
#[command(version)]
#[command(about = "Composition function that provisions a KMS crypto key for every encryption-key composite")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "XFN_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Directory containing tls.crt, tls.key and ca.crt
    #[arg(long, env = "TLS_SERVER_CERTS_DIR")]
    pub tls_certs_dir: Option<PathBuf>,

    /// Serve without TLS
    #[arg(long, default_value_t = false)]
    pub insecure: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Function configuration file (TOML or JSON)
    #[arg(long, env = "XFN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Per-request timeout, if one was given.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Resolve the listener settings.
    pub fn settings(&self) -> Result<ServerSettings> {
        Ok(ServerSettings {
            address: parse_address(&self.address)?,
            transport: Transport::select(self.tls_certs_dir.as_deref(), self.insecure)?,
            timeout: self.timeout(),
        })
    }
}
