use thiserror::Error;

/// Unified error type for the notary service.
///
/// Every failure the ledger adapter can hit lands in one of these kinds. The
/// HTTP layer collapses all of them into a per-endpoint 500 (see
/// `api::error`), so the split only matters for logs and metrics.
#[derive(Error, Debug)]
pub enum NotaryError {
    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Sign error: {0}")]
    Sign(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Ledger rejected request: {error}: {message}")]
    Rejected { error: String, message: String },

    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("History scan stopped after {pages} pages with more history remaining")]
    HistoryTruncated { pages: usize },
}

impl NotaryError {
    /// Short label used for log fields and metric names.
    pub fn kind(&self) -> &'static str {
        match self {
            NotaryError::Hash(_) => "hash",
            NotaryError::Sign(_) => "sign",
            NotaryError::Network(_) => "network",
            NotaryError::Rejected { .. } => "rejected",
            NotaryError::MalformedResponse(_) => "malformed_response",
            NotaryError::Config(_) => "config",
            NotaryError::HistoryTruncated { .. } => "history_truncated",
        }
    }
}

impl From<reqwest::Error> for NotaryError {
    fn from(e: reqwest::Error) -> Self {
        NotaryError::Network(e.to_string())
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, NotaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(NotaryError::Hash("x".into()).kind(), "hash");
        assert_eq!(
            NotaryError::Rejected { error: "actNotFound".into(), message: "Account not found.".into() }.kind(),
            "rejected"
        );
        assert_eq!(NotaryError::HistoryTruncated { pages: 10 }.kind(), "history_truncated");
    }

    #[test]
    fn test_rejected_display() {
        let e = NotaryError::Rejected { error: "actNotFound".into(), message: "Account not found.".into() };
        assert_eq!(e.to_string(), "Ledger rejected request: actNotFound: Account not found.");
    }
}
