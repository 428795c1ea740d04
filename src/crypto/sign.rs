use anyhow::{anyhow, Result};
use ed25519_dalek::{Signer as DalekSigner, Verifier as DalekVerifier};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature as SecpSignature, VerifyingKey as SecpVerifyingKey};

use crate::crypto::hash::sha512_half;
use crate::crypto::keys::{Keypair, PublicKey, SecretKey, ED25519_KEY_PREFIX};

/// Ledger-format signature: 64 raw bytes for ed25519, DER for secp256k1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

/// Trait for signing
pub trait Signer {
    fn sign(&self, msg: &[u8]) -> Result<Signature>;
}

/// Trait for verifying
pub trait Verifier {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()>;
}

impl Signer for Keypair {
    /// ed25519 signs the message itself; secp256k1 signs its SHA-512Half.
    fn sign(&self, msg: &[u8]) -> Result<Signature> {
        match &self.secret {
            SecretKey::Ed25519(sk) => Ok(Signature(sk.sign(msg).to_bytes().to_vec())),
            SecretKey::Secp256k1(sk) => {
                let digest = sha512_half(&[msg]);
                let sig: SecpSignature = sk
                    .sign_prehash(&digest)
                    .map_err(|e| anyhow!("secp256k1 signing failed: {}", e))?;
                // the ledger only accepts canonical (low-S) signatures
                let sig = sig.normalize_s().unwrap_or(sig);
                Ok(Signature(sig.to_der().as_bytes().to_vec()))
            }
        }
    }
}

impl Verifier for PublicKey {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()> {
        if self.0[0] == ED25519_KEY_PREFIX {
            let mut raw = [0u8; 32];
            raw.copy_from_slice(&self.0[1..]);
            let pk = ed25519_dalek::VerifyingKey::from_bytes(&raw)?;
            let ds = ed25519_dalek::Signature::from_slice(&sig.0)?;
            pk.verify(msg, &ds).map_err(|_| anyhow!("signature verification failed"))
        } else {
            let pk = SecpVerifyingKey::from_sec1_bytes(&self.0)?;
            let ds = SecpSignature::from_der(&sig.0)?;
            pk.verify_prehash(&sha512_half(&[msg]), &ds)
                .map_err(|_| anyhow!("signature verification failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyAlgorithm, Seed};

    fn wallet(algorithm: KeyAlgorithm) -> Keypair {
        Keypair::from_seed(&Seed { entropy: [0x42u8; 16], algorithm }).unwrap()
    }

    #[test]
    fn test_sign_verify_both_algorithms() {
        for alg in [KeyAlgorithm::Ed25519, KeyAlgorithm::Secp256k1] {
            let kp = wallet(alg);
            let sig = kp.sign(b"STX\0payload").unwrap();
            assert!(kp.public().verify(b"STX\0payload", &sig).is_ok(), "{alg}");
            assert!(kp.public().verify(b"STX\0tampered", &sig).is_err(), "{alg}");
        }
    }

    #[test]
    fn test_ed25519_signature_is_raw_64_bytes() {
        let sig = wallet(KeyAlgorithm::Ed25519).sign(b"msg").unwrap();
        assert_eq!(sig.0.len(), 64);
    }

    #[test]
    fn test_secp256k1_signature_is_der_and_deterministic() {
        let kp = wallet(KeyAlgorithm::Secp256k1);
        let a = kp.sign(b"msg").unwrap();
        let b = kp.sign(b"msg").unwrap();
        assert_eq!(a, b);
        // DER SEQUENCE tag
        assert_eq!(a.0[0], 0x30);
        let parsed = SecpSignature::from_der(&a.0).unwrap();
        assert!(parsed.normalize_s().is_none(), "signature must already be low-S");
    }

    #[test]
    fn test_random_wallets_sign_and_verify() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..8 {
            for algorithm in [KeyAlgorithm::Ed25519, KeyAlgorithm::Secp256k1] {
                let seed = Seed { entropy: rng.gen(), algorithm };
                let kp = Keypair::from_secret(&seed.encode()).unwrap();
                let msg: Vec<u8> = (0..rng.gen_range(0..256)).map(|_| rng.gen()).collect();
                let sig = kp.sign(&msg).unwrap();
                assert!(kp.public().verify(&msg, &sig).is_ok());
            }
        }
    }
}
