use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::crypto::{file_hash, memo_hex};
use crate::node::config::{FileConfig, NotaryConfig, Overrides};
use crate::node::Node;
use crate::utils::init_logging;

/// CLI for the notarization service.
#[derive(Parser)]
#[command(name = "ledger-notary", version)]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "NOTARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// rippled JSON-RPC endpoint
    #[arg(long, global = true, env = "JSON_RPC_ENDPOINT")]
    pub rpc_endpoint: Option<String>,

    /// family seed of the signing wallet
    #[arg(long, global = true, env = "SOURCE_SECRET", hide_env_values = true)]
    pub source_secret: Option<String>,

    /// emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Run the HTTP API
    Serve {
        /// listen address (host:port)
        #[arg(long, env = "NOTARY_BIND")]
        bind: Option<String>,
    },
    /// Print the notarization hash of a local file
    Hash {
        file: PathBuf,
    },
    /// Print the ledger address of the configured wallet
    Address,
}

impl Cli {
    fn resolve_config(&self, bind: Option<String>) -> Result<NotaryConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        NotaryConfig::resolve(
            file,
            Overrides {
                bind,
                rpc_endpoint: self.rpc_endpoint.clone(),
                source_secret: self.source_secret.clone(),
            },
        )
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match &cli.cmd {
        Cmd::Serve { bind } => {
            let config = cli.resolve_config(bind.clone())?;
            tracing::debug!(?config, "resolved configuration");

            let (svc, addr) = Node::new(config).start().await?;
            println!("listening on http://{}", addr);
            // Wait for Ctrl+C
            tokio::signal::ctrl_c().await?;
            println!("Shutting down...");
            svc.shutdown().await?;
            println!("Stopped");
            Ok(())
        }
        Cmd::Hash { file } => {
            let content = tokio::fs::read(file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let hash = file_hash(&content);
            println!("hash:     {}", hash);
            println!("memo hex: {}", memo_hex(hash.as_str()));
            Ok(())
        }
        Cmd::Address => {
            let wallet = cli.resolve_config(None)?.wallet()?;
            println!("{} ({})", wallet.address(), wallet.algorithm());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ledger-notary",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--rpc-endpoint",
            "http://localhost:5005",
        ])
        .unwrap();
        assert_eq!(cli.rpc_endpoint.as_deref(), Some("http://localhost:5005"));
        match cli.cmd {
            Cmd::Serve { bind } => assert_eq!(bind.as_deref(), Some("127.0.0.1:9000")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_hash_requires_file() {
        assert!(Cli::try_parse_from(["ledger-notary", "hash"]).is_err());
        let cli = Cli::try_parse_from(["ledger-notary", "hash", "report.pdf"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::Hash { file } if file == PathBuf::from("report.pdf")));
    }
}
