//! `LedgerService` over a rippled JSON-RPC endpoint.
//!
//! Submission flow (one attempt, no retries):
//! 1. `account_info` (current ledger) for the next `Sequence`
//! 2. `ledger` (validated) for `LastLedgerSequence` = validated + offset
//! 3. encode and sign an `AccountSet` with the memo locally
//! 4. `submit` the blob; the engine result is reported as-is
//!
//! Lookup walks `account_tx` over the whole ledger range, following markers
//! up to `history_page_limit` pages; running out of pages while a marker is
//! still pending is an error, not a miss.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use crate::crypto::{memo_hex, Keypair};
use crate::ledger::client::JsonRpcClient;
use crate::ledger::history::scan_page;
use crate::ledger::tx::{AccountSet, Memo};
use crate::ledger::{HistoryLookup, LedgerService, SubmitOutcome};
use crate::utils::{NotaryError, Result};

/// Settings for the XRPL adapter.
#[derive(Clone, Debug)]
pub struct XrplSettings {
    pub rpc_endpoint: String,
    pub fee_drops: u64,
    /// Hex MemoType; `48617368` is "Hash".
    pub memo_type: String,
    pub last_ledger_offset: u32,
    pub network_id: Option<u32>,
    pub request_timeout: Duration,
    pub history_page_limit: usize,
}

impl XrplSettings {
    pub fn new(rpc_endpoint: impl Into<String>) -> Self {
        Self {
            rpc_endpoint: rpc_endpoint.into(),
            fee_drops: 10_000,
            memo_type: "48617368".into(),
            last_ledger_offset: 20,
            network_id: None,
            request_timeout: Duration::from_secs(30),
            history_page_limit: 10,
        }
    }
}

pub struct XrplLedger {
    client: JsonRpcClient,
    wallet: Keypair,
    settings: XrplSettings,
}

fn field_u32(v: Option<&Value>) -> Option<u32> {
    match v? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn field_string(result: &Value, name: &str) -> Option<String> {
    result.get(name).and_then(Value::as_str).map(str::to_string)
}

impl XrplLedger {
    pub fn new(settings: XrplSettings, wallet: Keypair) -> Result<Self> {
        if settings.rpc_endpoint.trim().is_empty() {
            return Err(NotaryError::Config("ledger RPC endpoint is empty".into()));
        }
        hex::decode(&settings.memo_type)
            .map_err(|e| NotaryError::Config(format!("memo type is not valid hex: {}", e)))?;
        let client = JsonRpcClient::new(settings.rpc_endpoint.clone(), settings.request_timeout)?;
        Ok(Self { client, wallet, settings })
    }

    pub fn wallet(&self) -> &Keypair {
        &self.wallet
    }

    pub fn settings(&self) -> &XrplSettings {
        &self.settings
    }

    async fn next_sequence(&self) -> Result<u32> {
        let result = self
            .client
            .request("account_info", json!({ "account": self.wallet.address(), "ledger_index": "current" }))
            .await?;
        field_u32(result.pointer("/account_data/Sequence"))
            .ok_or_else(|| NotaryError::MalformedResponse("account_info has no account_data.Sequence".into()))
    }

    async fn validated_ledger_index(&self) -> Result<u32> {
        let result = self.client.request("ledger", json!({ "ledger_index": "validated" })).await?;
        field_u32(result.get("ledger_index"))
            .or_else(|| field_u32(result.pointer("/ledger/ledger_index")))
            .ok_or_else(|| NotaryError::MalformedResponse("ledger has no ledger_index".into()))
    }

    /// Build the autofilled, unsigned memo transaction for `hash`.
    pub async fn prepare_memo_tx(&self, hash: &str) -> Result<AccountSet> {
        let sequence = self.next_sequence().await?;
        let validated = self.validated_ledger_index().await?;
        let memo = Memo::from_hex(&self.settings.memo_type, &memo_hex(hash))?;
        Ok(AccountSet {
            account: self.wallet.account_id(),
            fee_drops: self.settings.fee_drops,
            sequence,
            last_ledger_sequence: Some(validated.saturating_add(self.settings.last_ledger_offset)),
            network_id: self.settings.network_id,
            memos: vec![memo],
        })
    }
}

#[async_trait]
impl LedgerService for XrplLedger {
    async fn submit_memo(&self, hash: &str) -> Result<SubmitOutcome> {
        let tx = self.prepare_memo_tx(hash).await?;
        let signed = tx.sign(&self.wallet)?;
        let tx_hash = signed.hash();

        let result = self.client.request("submit", json!({ "tx_blob": signed.blob_hex() })).await?;
        let outcome = SubmitOutcome {
            engine_result: field_string(&result, "engine_result"),
            engine_result_message: field_string(&result, "engine_result_message"),
            tx_hash: Some(tx_hash),
        };
        info!(
            tx_hash = outcome.tx_hash.as_deref().unwrap_or_default(),
            sequence = tx.sequence,
            engine_result = outcome.engine_result.as_deref().unwrap_or("none"),
            "memo transaction submitted"
        );
        Ok(outcome)
    }

    async fn find_memo(&self, hash: &str) -> Result<HistoryLookup> {
        let target = memo_hex(hash);
        let mut marker: Option<Value> = None;

        for page_no in 0..self.settings.history_page_limit.max(1) {
            let mut params = json!({
                "account": self.wallet.address(),
                "ledger_index_min": -1,
                "ledger_index_max": -1,
            });
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }

            let result = self.client.request("account_tx", params).await?;
            let page = scan_page(&result, &target)?;
            if let Some(found) = page.matched {
                info!(page = page_no, tx_hash = found.tx_hash.as_deref().unwrap_or_default(), "memo found in history");
                return Ok(HistoryLookup::Found(found));
            }
            match page.marker {
                Some(m) => marker = Some(m),
                None => return Ok(HistoryLookup::NotFound),
            }
        }

        // an absent memo can only be reported once the whole history was read
        let pages = self.settings.history_page_limit.max(1);
        warn!(pages, "history page limit reached before end of account history");
        Err(NotaryError::HistoryTruncated { pages })
    }
}
