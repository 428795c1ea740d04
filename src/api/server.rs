use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{self, AppState};
use crate::ledger::LedgerService;

/// Build the Axum router for the notarization API.
pub fn build_router(ledger: Arc<dyn LedgerService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload-file", post(handlers::upload_file))
        .route("/write-hash", post(handlers::write_hash))
        .route("/get-hash", post(handlers::get_hash))
        .route("/check-hash", post(handlers::check_hash))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(ledger))
}

/// ApiServer ties together a bound listener and the router.
pub struct ApiServer {
    listener: TcpListener,
    app: Router,
}

impl ApiServer {
    /// Bind the listening socket up front so address errors surface at startup.
    pub async fn bind(addr: SocketAddr, ledger: Arc<dyn LedgerService>, max_upload_bytes: usize) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, app: build_router(ledger, max_upload_bytes) })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` flips to true, then drain in-flight requests.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "Starting API server");
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await?;
        info!("API server stopped");
        Ok(())
    }
}
