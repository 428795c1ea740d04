//! Ledger module: the service's only external collaborator.
//!
//! - `LedgerService`: what the HTTP layer needs from a ledger (hash, submit, look up)
//! - `XrplLedger`: implementation over a rippled JSON-RPC endpoint
//! - codec / tx: canonical encoding and signing of the memo transaction
//! - history: scanning `account_tx` pages

pub mod client;
pub mod codec;
pub mod history;
pub mod tx;
pub mod xrpl;

pub use client::JsonRpcClient;
pub use history::HistoryMatch;
pub use xrpl::{XrplLedger, XrplSettings};

use async_trait::async_trait;

use crate::crypto::{file_hash, FileHash};
use crate::utils::Result;

/// Ledger verdict for one submission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// `engine_result`, e.g. `tesSUCCESS`.
    pub engine_result: Option<String>,
    pub engine_result_message: Option<String>,
    pub tx_hash: Option<String>,
}

/// Result of scanning account history for a hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryLookup {
    Found(HistoryMatch),
    NotFound,
}

/// Trait describing the ledger capabilities the API handlers require.
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait LedgerService: Send + Sync + 'static {
    /// Content hash as notarized on the ledger.
    fn hash(&self, content: &[u8]) -> FileHash {
        file_hash(content)
    }

    /// Submit one memo transaction carrying `hash` (used verbatim).
    async fn submit_memo(&self, hash: &str) -> Result<SubmitOutcome>;

    /// Look for a previously submitted memo carrying `hash`.
    async fn find_memo(&self, hash: &str) -> Result<HistoryLookup>;
}
