//! XRPL base58check encoding and account ids.
//!
//! Addresses and seeds use base58 with the Ripple alphabet, a version prefix,
//! and a 4-byte double SHA-256 checksum.

use anyhow::{anyhow, bail, Result};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// Version prefix for classic account addresses.
pub const ACCOUNT_ID_PREFIX: [u8; 1] = [0x00];

/// 20-byte account identifier: RIPEMD-160(SHA-256(public key)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Derive from a 33-byte XRPL public key (compressed secp256k1 or 0xED-prefixed ed25519).
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let sha = Sha256::digest(public_key);
        let rip = Ripemd160::digest(sha);
        let mut out = [0u8; 20];
        out.copy_from_slice(&rip);
        AccountId(out)
    }

    /// Classic `r...` address.
    pub fn to_address(&self) -> String {
        encode_check(&ACCOUNT_ID_PREFIX, &self.0)
    }

    /// Parse a classic address back into an account id.
    pub fn from_address(address: &str) -> Result<Self> {
        let (version, payload) = decode_check(address, ACCOUNT_ID_PREFIX.len())?;
        if version != ACCOUNT_ID_PREFIX {
            bail!("not a classic address: unexpected version prefix");
        }
        let bytes: [u8; 20] = payload
            .try_into()
            .map_err(|_| anyhow!("account id must be 20 bytes"))?;
        Ok(AccountId(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

fn checksum(data: &[u8]) -> [u8; 4] {
    let once = Sha256::digest(data);
    let twice = Sha256::digest(once);
    let mut out = [0u8; 4];
    out.copy_from_slice(&twice[..4]);
    out
}

/// base58check-encode `version || payload`.
pub fn encode_check(version: &[u8], payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(version.len() + payload.len() + 4);
    buf.extend_from_slice(version);
    buf.extend_from_slice(payload);
    let sum = checksum(&buf);
    buf.extend_from_slice(&sum);
    bs58::encode(buf).with_alphabet(bs58::Alphabet::RIPPLE).into_string()
}

/// Decode a base58check string, verify its checksum, and split off a
/// `version_len`-byte version prefix.
pub fn decode_check(s: &str, version_len: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    let raw = bs58::decode(s)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| anyhow!("invalid base58: {}", e))?;
    if raw.len() < version_len + 4 {
        bail!("base58check value too short");
    }
    let (body, sum) = raw.split_at(raw.len() - 4);
    if checksum(body) != sum {
        bail!("base58check checksum mismatch");
    }
    let (version, payload) = body.split_at(version_len);
    Ok((version.to_vec(), payload.to_vec()))
}
