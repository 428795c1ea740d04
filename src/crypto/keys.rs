//! Wallet keys derived from an XRPL family seed.
//!
//! A seed is 16 bytes of entropy, base58check-encoded with a version prefix
//! that also selects the key algorithm:
//! - `[0x21]` → secp256k1 (addresses from the classic `s...` seeds)
//! - `[0x01, 0xE1, 0x4B]` → ed25519 (`sEd...` seeds)

use anyhow::{anyhow, bail, Result};
use k256::ecdsa::SigningKey as SecpSigningKey;
use k256::Scalar;
use std::fmt;

use crate::crypto::address::{decode_check, encode_check, AccountId};
use crate::crypto::hash::sha512_half;

const SECP256K1_SEED_PREFIX: [u8; 1] = [0x21];
const ED25519_SEED_PREFIX: [u8; 3] = [0x01, 0xE1, 0x4B];

/// Public key prefix that marks an ed25519 key on the ledger.
pub const ED25519_KEY_PREFIX: u8 = 0xED;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Secp256k1,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Secp256k1 => f.write_str("secp256k1"),
            KeyAlgorithm::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// Decoded family seed.
#[derive(Clone)]
pub struct Seed {
    pub entropy: [u8; 16],
    pub algorithm: KeyAlgorithm,
}

impl Seed {
    /// Decode a base58check seed string.
    pub fn decode(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        // Length of the version prefix tells the algorithms apart: 1 + 16 vs 3 + 16 bytes.
        let (version, entropy) = match decode_check(encoded, ED25519_SEED_PREFIX.len()) {
            Ok((v, e)) if v == ED25519_SEED_PREFIX && e.len() == 16 => (KeyAlgorithm::Ed25519, e),
            _ => {
                let (v, e) = decode_check(encoded, SECP256K1_SEED_PREFIX.len())?;
                if v != SECP256K1_SEED_PREFIX || e.len() != 16 {
                    bail!("unrecognized seed encoding");
                }
                (KeyAlgorithm::Secp256k1, e)
            }
        };
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&entropy);
        Ok(Self { entropy: bytes, algorithm: version })
    }

    /// Re-encode as a base58check seed string.
    pub fn encode(&self) -> String {
        match self.algorithm {
            KeyAlgorithm::Secp256k1 => encode_check(&SECP256K1_SEED_PREFIX, &self.entropy),
            KeyAlgorithm::Ed25519 => encode_check(&ED25519_SEED_PREFIX, &self.entropy),
        }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("algorithm", &self.algorithm).finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub(crate) enum SecretKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(SecpSigningKey),
}

/// Signing wallet: private key, 33-byte ledger public key, and account id.
#[derive(Clone)]
pub struct Keypair {
    pub(crate) secret: SecretKey,
    public: [u8; 33],
    account: AccountId,
}

impl Keypair {
    /// Derive the wallet for the master key of `seed`.
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        match seed.algorithm {
            KeyAlgorithm::Ed25519 => {
                let sk = ed25519_dalek::SigningKey::from_bytes(&sha512_half(&[&seed.entropy]));
                let mut public = [0u8; 33];
                public[0] = ED25519_KEY_PREFIX;
                public[1..].copy_from_slice(sk.verifying_key().as_bytes());
                Ok(Self::assemble(SecretKey::Ed25519(sk), public))
            }
            KeyAlgorithm::Secp256k1 => {
                let root = derive_root(&seed.entropy)?;
                let root_public = compressed(&root)?;
                let intermediate = derive_intermediate(&root_public)?;
                let sum: Scalar =
                    *root.as_nonzero_scalar().as_ref() + *intermediate.as_nonzero_scalar().as_ref();
                let sk = SecpSigningKey::from_bytes(&sum.to_bytes())
                    .map_err(|_| anyhow!("derived secp256k1 key is out of range"))?;
                let public = compressed(&sk)?;
                Ok(Self::assemble(SecretKey::Secp256k1(sk), public))
            }
        }
    }

    /// Decode `secret` as a family seed and derive its wallet.
    pub fn from_secret(secret: &str) -> Result<Self> {
        Self::from_seed(&Seed::decode(secret)?)
    }

    fn assemble(secret: SecretKey, public: [u8; 33]) -> Self {
        let account = AccountId::from_public_key(&public);
        Self { secret, public, account }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.secret {
            SecretKey::Ed25519(_) => KeyAlgorithm::Ed25519,
            SecretKey::Secp256k1(_) => KeyAlgorithm::Secp256k1,
        }
    }

    /// Ledger-format public key (`SigningPubKey`).
    pub fn public(&self) -> PublicKey {
        PublicKey(self.public)
    }

    pub fn account_id(&self) -> AccountId {
        self.account
    }

    /// Classic address of the account.
    pub fn address(&self) -> String {
        self.account.to_address()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("algorithm", &self.algorithm())
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// 33-byte ledger public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub [u8; 33]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

fn compressed(sk: &SecpSigningKey) -> Result<[u8; 33]> {
    let point = sk.verifying_key().to_encoded_point(true);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| anyhow!("compressed secp256k1 point must be 33 bytes"))
}

/// First SHA-512Half(seed || seq) that is a valid non-zero scalar.
fn derive_root(entropy: &[u8; 16]) -> Result<SecpSigningKey> {
    for seq in 0u32..=u32::MAX {
        let candidate = sha512_half(&[entropy, &seq.to_be_bytes()]);
        if let Ok(sk) = SecpSigningKey::from_bytes(&candidate.into()) {
            return Ok(sk);
        }
    }
    bail!("no valid root key for seed")
}

/// Intermediate key for account index 0.
fn derive_intermediate(root_public: &[u8; 33]) -> Result<SecpSigningKey> {
    let account_index = 0u32.to_be_bytes();
    for subseq in 0u32..=u32::MAX {
        let candidate = sha512_half(&[root_public, &account_index, &subseq.to_be_bytes()]);
        if let Ok(sk) = SecpSigningKey::from_bytes(&candidate.into()) {
            return Ok(sk);
        }
    }
    bail!("no valid intermediate key for seed")
}
