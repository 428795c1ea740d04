//! Service configuration.
//!
//! Sources, strongest first: CLI flag / environment variable (handled by
//! clap), TOML file, built-in default. The wallet secret never appears in
//! `Debug` output.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::crypto::Keypair;
use crate::ledger::XrplSettings;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// On-disk TOML layout; every key is optional.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub rpc_endpoint: Option<String>,
    pub source_secret: Option<String>,
    pub fee_drops: Option<u64>,
    pub memo_type: Option<String>,
    pub last_ledger_offset: Option<u32>,
    pub network_id: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub history_page_limit: Option<usize>,
    pub max_upload_bytes: Option<usize>,
}

impl FileConfig {
    /// Load config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }
}

/// Values given on the command line or through the environment.
#[derive(Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub rpc_endpoint: Option<String>,
    pub source_secret: Option<String>,
}

/// Resolved, process-wide configuration. Immutable after startup.
pub struct NotaryConfig {
    pub bind: SocketAddr,
    pub source_secret: SecretString,
    pub ledger: XrplSettings,
    pub max_upload_bytes: usize,
}

impl NotaryConfig {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let bind = overrides
            .bind
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind.parse().with_context(|| format!("invalid bind address {:?}", bind))?;

        let secret = overrides
            .source_secret
            .or(file.source_secret)
            .filter(|s| !s.trim().is_empty())
            .context("wallet secret is not configured (set SOURCE_SECRET)")?;

        let mut ledger = XrplSettings::new(overrides.rpc_endpoint.or(file.rpc_endpoint).unwrap_or_default());
        if let Some(v) = file.fee_drops {
            ledger.fee_drops = v;
        }
        if let Some(v) = file.memo_type {
            ledger.memo_type = v;
        }
        if let Some(v) = file.last_ledger_offset {
            ledger.last_ledger_offset = v;
        }
        if let Some(v) = file.request_timeout_secs {
            ledger.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.history_page_limit {
            ledger.history_page_limit = v;
        }
        ledger.network_id = file.network_id;

        Ok(Self {
            bind,
            source_secret: SecretString::from(secret),
            ledger,
            max_upload_bytes: file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    /// Derive the signing wallet from the configured secret.
    pub fn wallet(&self) -> Result<Keypair> {
        Keypair::from_secret(self.source_secret.expose_secret()).context("decoding wallet secret")
    }
}

impl fmt::Debug for NotaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotaryConfig")
            .field("bind", &self.bind)
            .field("source_secret", &"[REDACTED]")
            .field("ledger", &self.ledger)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
