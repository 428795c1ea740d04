//! Crypto module: hashing, wallet keys, addresses, signing.
//!
//! - Hash: SHA-256 file hashes and SHA-512Half
//! - Keys: XRPL family seeds, ed25519 / secp256k1 key derivation
//! - Address: base58check (Ripple alphabet) and account ids
//! - Sign: ledger-format signatures

pub mod hash;
pub mod keys;
pub mod address;
pub mod sign;

pub use hash::{file_hash, memo_hex, sha512_half, FileHash};
pub use keys::{KeyAlgorithm, Keypair, PublicKey, Seed};
pub use address::AccountId;
pub use sign::{Signature, Signer, Verifier};
