//! Content hashing.
//!
//! - `file_hash`: SHA-256 of uploaded bytes, uppercase hex (the notarized value)
//! - `memo_hex`: hex of the UTF-8 bytes of a hash string (what goes on-chain)
//! - `sha512_half`: XRPL's first-32-bytes-of-SHA-512 primitive

use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// Uppercase hex SHA-256 digest of some content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileHash(String);

impl FileHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash file content with SHA-256.
pub fn file_hash(content: &[u8]) -> FileHash {
    FileHash(hex::encode_upper(Sha256::digest(content)))
}

/// Hex encoding of the UTF-8 bytes of `s`.
///
/// This is the memo data form of a hash and also what `get-hash` reports.
pub fn memo_hex(s: &str) -> String {
    hex::encode(s.as_bytes())
}

/// First half of a SHA-512 digest.
pub fn sha512_half(chunks: &[&[u8]]) -> [u8; 32] {
    let mut h = Sha512::new();
    for c in chunks {
        h.update(c);
    }
    let full = h.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&full[..32]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_HASH: &str = "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824";

    #[test]
    fn test_file_hash_known_value() {
        assert_eq!(file_hash(b"hello").as_str(), HELLO_HASH);
    }

    #[test]
    fn test_file_hash_shape() {
        let h = file_hash(b"");
        assert_eq!(h.as_str().len(), 64);
        assert!(h.as_str().chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_eq!(h, file_hash(b""));
        assert_ne!(h, file_hash(b"\0"));
    }

    #[test]
    fn test_memo_hex_is_double_encoding() {
        let encoded = memo_hex(HELLO_HASH);
        assert_eq!(encoded.len(), 128);
        assert!(encoded.starts_with("3243463234444241"));
        assert_eq!(hex::decode(&encoded).unwrap(), HELLO_HASH.as_bytes());
    }

    #[test]
    fn test_memo_hex_arbitrary_string() {
        assert_eq!(memo_hex("not a hash!"), "6e6f742061206861736821");
    }

    #[test]
    fn test_sha512_half_chunks() {
        let whole = sha512_half(&[b"hello world"]);
        let split = sha512_half(&[b"hello ", b"world"]);
        assert_eq!(whole, split);
        let full = Sha512::digest(b"hello world");
        assert_eq!(&whole[..], &full[..32]);
    }
}
