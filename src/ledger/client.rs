//! Minimal JSON-RPC client for a rippled-compatible endpoint.
//!
//! rippled's JSON-RPC dialect: POST `{"method": m, "params": [ {...} ]}`,
//! answer `{"result": {..., "status": "success" | "error"}}`. Errors come
//! back with HTTP 200 and `status: "error"`, so the HTTP status alone says
//! little.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::utils::{NotaryError, Result};

#[derive(Clone, Debug)]
pub struct JsonRpcClient {
    http: Client,
    endpoint: String,
}

impl JsonRpcClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotaryError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `method` with a single params object and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({ "method": method, "params": [params] });
        debug!(method, endpoint = %self.endpoint, "ledger rpc request");

        let resp = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let payload: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(NotaryError::MalformedResponse(format!("{} returned invalid JSON: {}", method, e)))
            }
            Err(_) => return Err(NotaryError::Network(format!("{} failed with HTTP {}", method, status))),
        };

        let result = match payload.get("result") {
            Some(r) => r.clone(),
            None if status.is_success() => {
                return Err(NotaryError::MalformedResponse(format!("{} response has no result", method)))
            }
            None => return Err(NotaryError::Network(format!("{} failed with HTTP {}", method, status))),
        };

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let error = result.get("error").and_then(Value::as_str).unwrap_or("unknown").to_string();
            let message = result
                .get("error_message")
                .or_else(|| result.get("error_exception"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(NotaryError::Rejected { error, message });
        }
        if !status.is_success() {
            return Err(NotaryError::Network(format!("{} failed with HTTP {}", method, status)));
        }
        Ok(result)
    }
}
