//! HTTP API module
//!
//! - POST /upload-file, /write-hash, /get-hash, /check-hash
//! - Diagnostic endpoints: /health, /metrics
//! - `error`: the one place internal errors turn into HTTP responses
//!
//! To integrate: hand any `LedgerService` to `build_router()` or `ApiServer::bind()`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, Endpoint};
pub use handlers::AppState;
pub use server::{build_router, ApiServer};
