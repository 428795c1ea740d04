use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, Endpoint};
use crate::crypto::memo_hex;
use crate::ledger::{HistoryLookup, LedgerService, SubmitOutcome};
use crate::utils::{NotaryError, METRICS};

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Shared handler state: one ledger handle, built at startup.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerService>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerService>) -> Self {
        Self { ledger }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub status: String,
    pub hash: String,
    pub transaction_result: Option<String>,
    pub result_message: Option<String>,
}

impl TransactionResponse {
    fn success(hash: String, outcome: SubmitOutcome) -> Self {
        Self {
            status: "success".into(),
            hash,
            transaction_result: outcome.engine_result,
            result_message: outcome.engine_result_message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashResponse {
    pub status: String,
    pub hash: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckHashResponse {
    pub status: String,
    pub message: String,
    /// Absent when not found; `null` when found without a ledger date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Option<u64>>,
}

impl From<HistoryLookup> for CheckHashResponse {
    fn from(lookup: HistoryLookup) -> Self {
        match lookup {
            HistoryLookup::Found(m) => Self {
                status: "success".into(),
                message: "Hash found in transaction memos.".into(),
                timestamp: Some(m.timestamp),
            },
            HistoryLookup::NotFound => Self {
                status: "not_found".into(),
                message: "Hash not found in transaction memos.".into(),
                timestamp: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteHashParams {
    pub hash_hex: String,
}

/// Pull the `file` field out of a multipart body.
///
/// A missing or malformed body is the caller's fault (422), an oversized one
/// is 413; a stream that breaks while the file itself is read counts as a
/// hashing failure.
async fn read_file(
    endpoint: Endpoint,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::rejected(endpoint, e.status(), e.body_text()))?;
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::rejected(endpoint, e.status(), e.body_text()))?;
        let Some(field) = field else {
            return Err(ApiError::bad_request(endpoint, format!("Field required: {}", FILE_FIELD)));
        };
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::rejected(endpoint, e.status(), e.body_text())
                } else {
                    ApiError::internal(endpoint, NotaryError::Hash(format!("reading upload: {}", e)))
                }
            });
        }
    }
}

/// POST /upload-file
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let endpoint = Endpoint::UploadFile;
    METRICS.inc_counter("notary_upload_file_requests_total");

    let content = read_file(endpoint, multipart).await?;
    let hash = state.ledger.hash(&content).into_string();
    info!(%hash, size = content.len(), "notarizing uploaded file");

    let outcome = state.ledger.submit_memo(&hash).await.map_err(|e| ApiError::internal(endpoint, e))?;
    Ok(Json(TransactionResponse::success(hash, outcome)))
}

/// POST /write-hash?hash_hex=...
///
/// The hash is written as given; it is not checked to be hex.
pub async fn write_hash(
    State(state): State<AppState>,
    params: Result<Query<WriteHashParams>, QueryRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let endpoint = Endpoint::WriteHash;
    METRICS.inc_counter("notary_write_hash_requests_total");

    let Query(params) = params.map_err(|e| ApiError::bad_request(endpoint, e.body_text()))?;
    info!(hash = %params.hash_hex, "writing caller-supplied hash");

    let outcome = state
        .ledger
        .submit_memo(&params.hash_hex)
        .await
        .map_err(|e| ApiError::internal(endpoint, e))?;
    Ok(Json(TransactionResponse::success(params.hash_hex, outcome)))
}

/// POST /get-hash
///
/// Reports the hex of the hash string's UTF-8 bytes, i.e. the memo data form,
/// not the hash itself.
pub async fn get_hash(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<HashResponse>, ApiError> {
    METRICS.inc_counter("notary_get_hash_requests_total");

    let content = read_file(Endpoint::GetHash, multipart).await?;
    let hash = state.ledger.hash(&content);
    Ok(Json(HashResponse { status: "success".into(), hash: memo_hex(hash.as_str()) }))
}

/// POST /check-hash
pub async fn check_hash(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CheckHashResponse>, ApiError> {
    let endpoint = Endpoint::CheckHash;
    METRICS.inc_counter("notary_check_hash_requests_total");

    let content = read_file(endpoint, multipart).await?;
    let hash = state.ledger.hash(&content);
    let lookup = state
        .ledger
        .find_memo(hash.as_str())
        .await
        .map_err(|e| ApiError::internal(endpoint, e))?;
    Ok(Json(lookup.into()))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics
pub async fn metrics() -> String {
    METRICS.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::HistoryMatch;

    #[test]
    fn test_check_hash_response_shapes() {
        let found: CheckHashResponse =
            HistoryLookup::Found(HistoryMatch { timestamp: Some(812), tx_hash: None }).into();
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({"status": "success", "message": "Hash found in transaction memos.", "timestamp": 812})
        );

        let undated: CheckHashResponse =
            HistoryLookup::Found(HistoryMatch { timestamp: None, tx_hash: None }).into();
        assert_eq!(serde_json::to_value(&undated).unwrap()["timestamp"], serde_json::Value::Null);

        let missing: CheckHashResponse = HistoryLookup::NotFound.into();
        let v = serde_json::to_value(&missing).unwrap();
        assert_eq!(v, serde_json::json!({"status": "not_found", "message": "Hash not found in transaction memos."}));
    }

    #[test]
    fn test_transaction_response_field_names() {
        let outcome = SubmitOutcome {
            engine_result: Some("tesSUCCESS".into()),
            engine_result_message: Some("The transaction was applied.".into()),
            tx_hash: Some("AB".into()),
        };
        let v = serde_json::to_value(TransactionResponse::success("H".into(), outcome)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "status": "success",
                "hash": "H",
                "transactionResult": "tesSUCCESS",
                "resultMessage": "The transaction was applied."
            })
        );
    }
}
