//! Notarize file hashes on the XRP Ledger.
//!
//! A file's SHA-256 digest is written as a memo on an `AccountSet`
//! transaction signed by the service wallet; later the wallet's history is
//! scanned to prove when that digest was recorded.

pub mod api;
pub mod crypto;
pub mod ledger;
pub mod node;
pub mod utils;
