//! Node orchestration: derive the wallet, build the ledger adapter, start the API.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::ApiServer;
use crate::ledger::{LedgerService, XrplLedger};
use crate::node::config::NotaryConfig;
use crate::node::service_handle::ServiceHandle;

/// Main Node object
pub struct Node {
    cfg: NotaryConfig,
}

impl Node {
    pub fn new(cfg: NotaryConfig) -> Self {
        Self { cfg }
    }

    /// Start the service and return a ServiceHandle for graceful shutdown
    /// together with the address actually bound.
    pub async fn start(self) -> Result<(ServiceHandle, SocketAddr)> {
        let wallet = self.cfg.wallet()?;
        info!(
            address = %wallet.address(),
            algorithm = %wallet.algorithm(),
            endpoint = %self.cfg.ledger.rpc_endpoint,
            "wallet loaded"
        );

        let ledger = XrplLedger::new(self.cfg.ledger.clone(), wallet).context("building ledger client")?;
        let ledger: Arc<dyn LedgerService> = Arc::new(ledger);
        self.start_with(ledger).await
    }

    /// Start the API in front of an already built ledger handle.
    pub async fn start_with(self, ledger: Arc<dyn LedgerService>) -> Result<(ServiceHandle, SocketAddr)> {
        let (mut svc_handle, shutdown_rx) = ServiceHandle::new();

        let server = ApiServer::bind(self.cfg.bind, ledger, self.cfg.max_upload_bytes)
            .await
            .with_context(|| format!("binding API server to {}", self.cfg.bind))?;
        let addr = server.local_addr()?;

        let h: JoinHandle<Result<()>> = tokio::spawn(async move {
            if let Err(e) = server.run(shutdown_rx).await {
                error!("API server failed: {:?}", e);
                return Err(e);
            }
            Ok(())
        });
        svc_handle.attach("api", h);

        info!(%addr, "Node started");
        Ok((svc_handle, addr))
    }
}
