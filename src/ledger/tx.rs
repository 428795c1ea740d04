//! Memo-bearing `AccountSet` transaction.
//!
//! An `AccountSet` with no flags changes nothing on the account, which makes
//! it the cheapest carrier for a memo. The transaction is encoded twice: once
//! without `TxnSignature` for signing, once with it for submission.

use crate::crypto::{sha512_half, AccountId, Keypair, Signer};
use crate::ledger::codec::{
    FieldId, FieldValue, Serializer, TYPE_ACCOUNT_ID, TYPE_AMOUNT, TYPE_ARRAY, TYPE_BLOB,
    TYPE_OBJECT, TYPE_UINT16, TYPE_UINT32,
};
use crate::utils::{NotaryError, Result};

const TRANSACTION_TYPE: FieldId = FieldId::new(TYPE_UINT16, 2);
const NETWORK_ID: FieldId = FieldId::new(TYPE_UINT32, 1);
const FLAGS: FieldId = FieldId::new(TYPE_UINT32, 2);
const SEQUENCE: FieldId = FieldId::new(TYPE_UINT32, 4);
const LAST_LEDGER_SEQUENCE: FieldId = FieldId::new(TYPE_UINT32, 27);
const FEE: FieldId = FieldId::new(TYPE_AMOUNT, 8);
const SIGNING_PUB_KEY: FieldId = FieldId::new(TYPE_BLOB, 3);
const TXN_SIGNATURE: FieldId = FieldId::new(TYPE_BLOB, 4);
const MEMO_TYPE: FieldId = FieldId::new(TYPE_BLOB, 12);
const MEMO_DATA: FieldId = FieldId::new(TYPE_BLOB, 13);
const ACCOUNT: FieldId = FieldId::new(TYPE_ACCOUNT_ID, 1);
const MEMO: FieldId = FieldId::new(TYPE_OBJECT, 10);
const MEMOS: FieldId = FieldId::new(TYPE_ARRAY, 9);

const ACCOUNT_SET: u16 = 3;

/// Hash prefix for single-signed transaction payloads ("STX\0").
const SIGNING_PREFIX: [u8; 4] = [0x53, 0x54, 0x58, 0x00];
/// Hash prefix for transaction ids ("TXN\0").
const TXN_ID_PREFIX: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// A memo; both parts are raw bytes (JSON shows them as hex).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memo {
    pub memo_type: Vec<u8>,
    pub memo_data: Vec<u8>,
}

impl Memo {
    /// Build from hex strings, as memos are written in JSON.
    pub fn from_hex(memo_type: &str, memo_data: &str) -> Result<Self> {
        let decode = |what: &str, s: &str| {
            hex::decode(s).map_err(|e| NotaryError::Sign(format!("{} is not valid hex: {}", what, e)))
        };
        Ok(Self { memo_type: decode("MemoType", memo_type)?, memo_data: decode("MemoData", memo_data)? })
    }

    fn to_field(&self) -> (FieldId, FieldValue) {
        (
            MEMO,
            FieldValue::Object(vec![
                (MEMO_TYPE, FieldValue::Blob(self.memo_type.clone())),
                (MEMO_DATA, FieldValue::Blob(self.memo_data.clone())),
            ]),
        )
    }
}

/// Fully autofilled, not yet signed `AccountSet`.
#[derive(Clone, Debug)]
pub struct AccountSet {
    pub account: AccountId,
    pub fee_drops: u64,
    pub sequence: u32,
    pub last_ledger_sequence: Option<u32>,
    pub network_id: Option<u32>,
    pub memos: Vec<Memo>,
}

/// Signed transaction ready for `submit`.
#[derive(Clone, Debug)]
pub struct SignedTx {
    pub blob: Vec<u8>,
}

impl SignedTx {
    /// Uppercase hex blob for the `tx_blob` parameter.
    pub fn blob_hex(&self) -> String {
        hex::encode_upper(&self.blob)
    }

    /// Transaction id as reported by the ledger.
    pub fn hash(&self) -> String {
        hex::encode_upper(sha512_half(&[&TXN_ID_PREFIX, &self.blob]))
    }
}

impl AccountSet {
    fn serializer(&self, signing_pub_key: &[u8]) -> Serializer {
        let mut s = Serializer::new()
            .field(TRANSACTION_TYPE, FieldValue::UInt16(ACCOUNT_SET))
            .field(FLAGS, FieldValue::UInt32(0))
            .field(SEQUENCE, FieldValue::UInt32(self.sequence))
            .field(FEE, FieldValue::NativeAmount(self.fee_drops))
            .field(SIGNING_PUB_KEY, FieldValue::Blob(signing_pub_key.to_vec()))
            .field(ACCOUNT, FieldValue::AccountId(self.account.0));
        if let Some(lls) = self.last_ledger_sequence {
            s = s.field(LAST_LEDGER_SEQUENCE, FieldValue::UInt32(lls));
        }
        if let Some(id) = self.network_id {
            s = s.field(NETWORK_ID, FieldValue::UInt32(id));
        }
        if !self.memos.is_empty() {
            s = s.field(MEMOS, FieldValue::Array(self.memos.iter().map(Memo::to_field).collect()));
        }
        s
    }

    /// Bytes the wallet signs: prefix plus every field except the signature.
    pub fn signing_payload(&self, signing_pub_key: &[u8]) -> Result<Vec<u8>> {
        let mut out = SIGNING_PREFIX.to_vec();
        out.extend(self.serializer(signing_pub_key).finish()?);
        Ok(out)
    }

    /// Sign with `wallet` and produce the submission blob.
    pub fn sign(&self, wallet: &Keypair) -> Result<SignedTx> {
        if wallet.account_id() != self.account {
            return Err(NotaryError::Sign("wallet does not own the transaction account".into()));
        }
        let public = wallet.public();
        let payload = self.signing_payload(public.as_bytes())?;
        let signature = wallet.sign(&payload).map_err(|e| NotaryError::Sign(e.to_string()))?;
        let blob = self
            .serializer(public.as_bytes())
            .field(TXN_SIGNATURE, FieldValue::Blob(signature.0))
            .finish()?;
        Ok(SignedTx { blob })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{memo_hex, KeyAlgorithm, Seed, Verifier};

    fn wallet(algorithm: KeyAlgorithm) -> Keypair {
        Keypair::from_seed(&Seed { entropy: [9u8; 16], algorithm }).unwrap()
    }

    fn tx_for(kp: &Keypair, memo_data: &str) -> AccountSet {
        AccountSet {
            account: kp.account_id(),
            fee_drops: 10_000,
            sequence: 5,
            last_ledger_sequence: Some(120),
            network_id: None,
            memos: vec![Memo::from_hex("48617368", &memo_hex(memo_data)).unwrap()],
        }
    }

    #[test]
    fn test_blob_layout() {
        let kp = wallet(KeyAlgorithm::Ed25519);
        let signed = tx_for(&kp, "ABC").sign(&kp).unwrap();
        let b = &signed.blob;
        // TransactionType=3, Flags=0, Sequence=5, LastLedgerSequence=120
        assert_eq!(&b[..3], &[0x12, 0x00, 0x03]);
        assert_eq!(&b[3..8], &[0x22, 0, 0, 0, 0]);
        assert_eq!(&b[8..13], &[0x24, 0, 0, 0, 5]);
        assert_eq!(&b[13..19], &[0x20, 0x1B, 0, 0, 0, 120]);
        assert_eq!(&b[19..28], &[0x68, 0x40, 0, 0, 0, 0, 0, 0x27, 0x10]);
        // SigningPubKey: 33-byte blob
        assert_eq!(&b[28..30], &[0x73, 33]);
        // memo tail: MemoType "Hash", MemoData = UTF-8 bytes of "ABC", end markers
        let tail = [0xF9, 0xEA, 0x7C, 0x04, 0x48, 0x61, 0x73, 0x68, 0x7D, 0x03, 0x41, 0x42, 0x43, 0xE1, 0xF1];
        assert!(b.ends_with(&tail));
    }

    #[test]
    fn test_signature_covers_payload() {
        for alg in [KeyAlgorithm::Ed25519, KeyAlgorithm::Secp256k1] {
            let kp = wallet(alg);
            let tx = tx_for(&kp, "2CF24DBA");
            let signed = tx.sign(&kp).unwrap();
            let payload = tx.signing_payload(kp.public().as_bytes()).unwrap();
            assert_eq!(&payload[..4], b"STX\0");

            // TxnSignature follows SigningPubKey: 0x74, len, sig
            let pk_end = 28 + 2 + 33;
            assert_eq!(signed.blob[pk_end], 0x74);
            let sig_len = signed.blob[pk_end + 1] as usize;
            let sig = crate::crypto::Signature(signed.blob[pk_end + 2..pk_end + 2 + sig_len].to_vec());
            assert!(kp.public().verify(&payload, &sig).is_ok());
        }
    }

    #[test]
    fn test_network_id_encoded_first() {
        let kp = wallet(KeyAlgorithm::Ed25519);
        let mut tx = tx_for(&kp, "X");
        tx.network_id = Some(21_338);
        let signed = tx.sign(&kp).unwrap();
        assert_eq!(&signed.blob[3..8], &[0x21, 0x00, 0x00, 0x53, 0x5A]);
    }

    #[test]
    fn test_tx_hash_shape() {
        let kp = wallet(KeyAlgorithm::Secp256k1);
        let signed = tx_for(&kp, "X").sign(&kp).unwrap();
        let h = signed.hash();
        assert_eq!(h.len(), 64);
        assert_eq!(h, signed.hash());
        assert_eq!(signed.blob_hex(), hex::encode_upper(&signed.blob));
    }

    #[test]
    fn test_foreign_wallet_rejected() {
        let owner = wallet(KeyAlgorithm::Ed25519);
        let other = wallet(KeyAlgorithm::Secp256k1);
        let err = tx_for(&owner, "X").sign(&other).unwrap_err();
        assert!(matches!(err, NotaryError::Sign(_)));
    }

    #[test]
    fn test_memo_from_hex_rejects_garbage() {
        assert!(Memo::from_hex("zz", "00").is_err());
    }
}
