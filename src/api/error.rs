//! Error translation boundary between the ledger layer and HTTP.
//!
//! Internal failures of any kind become a 500 with the endpoint's fixed
//! `detail` message; the cause is only logged. Malformed requests get 422.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::utils::{NotaryError, METRICS};

/// The four notarization endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    UploadFile,
    WriteHash,
    GetHash,
    CheckHash,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::UploadFile => "upload_file",
            Endpoint::WriteHash => "write_hash",
            Endpoint::GetHash => "get_hash",
            Endpoint::CheckHash => "check_hash",
        }
    }

    /// Static `detail` returned on any internal failure.
    pub fn failure_detail(&self) -> &'static str {
        match self {
            Endpoint::UploadFile | Endpoint::WriteHash => "Failed to process transaction.",
            Endpoint::GetHash => "Failed to get hash.",
            Endpoint::CheckHash => "Failed to check hash.",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Anything that went wrong after the request was accepted.
    Internal { endpoint: Endpoint, source: NotaryError },
    /// Missing, unreadable or oversized request input.
    BadRequest { endpoint: Endpoint, status: StatusCode, detail: String },
}

impl ApiError {
    pub fn internal(endpoint: Endpoint, source: NotaryError) -> Self {
        ApiError::Internal { endpoint, source }
    }

    pub fn bad_request(endpoint: Endpoint, detail: impl Into<String>) -> Self {
        ApiError::BadRequest { endpoint, status: StatusCode::UNPROCESSABLE_ENTITY, detail: detail.into() }
    }

    /// Request error raised by an extractor. Its status is kept when the body
    /// limit tripped (413); any other client error is reported as 422.
    pub fn rejected(endpoint: Endpoint, status: StatusCode, detail: impl Into<String>) -> Self {
        let status = match status {
            StatusCode::PAYLOAD_TOO_LARGE => status,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::BadRequest { endpoint, status, detail: detail.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal { endpoint, source } => {
                error!(endpoint = endpoint.name(), kind = source.kind(), error = %source, "request failed");
                METRICS.inc_counter(&format!("notary_{}_errors_total", endpoint.name()));
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": endpoint.failure_detail() })))
                    .into_response()
            }
            ApiError::BadRequest { endpoint, status, detail } => {
                warn!(endpoint = endpoint.name(), status = status.as_u16(), %detail, "rejected request");
                METRICS.inc_counter(&format!("notary_{}_invalid_total", endpoint.name()));
                (status, Json(json!({ "detail": detail }))).into_response()
            }
        }
    }
}
