//! Fixed-size digest type and the hash functions that produce it

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte digest: a leaf hash, an aggregated branch hash or a root
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Length of every digest in bytes
    pub const LEN: usize = 32;

    /// Create a hash from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| Error::InvalidHash(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidHash(format!("expected {} bytes, got {}", Self::LEN, b.len()))
        })?;
        Ok(Hash(arr))
    }

    /// Get a short prefix for display (first 7 chars, like git)
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

/// The hash function a trie aggregates its values with
///
/// SHA-256 is the default and matches digests produced by other
/// implementations of this trie. BLAKE3 is faster but yields different
/// roots for the same contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    /// Hash arbitrary data
    pub fn digest(self, data: &[u8]) -> Hash {
        self.digest_many(&[data])
    }

    /// Hash the concatenation of several parts, in order
    pub fn digest_many(self, parts: &[&[u8]]) -> Hash {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                Hash(hasher.finalize().into())
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                Hash(*hasher.finalize().as_bytes())
            }
        }
    }

    /// Digest of a branch with two children: `H(left || right)`
    pub fn digest_pair(self, left: &Hash, right: &Hash) -> Hash {
        self.digest_many(&[left.as_bytes(), right.as_bytes()])
    }

    /// Digest of the empty input, the root of an empty trie
    pub fn empty(self) -> Hash {
        self.digest(&[])
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_sha256_empty_digest() {
        assert_eq!(HashAlgorithm::Sha256.empty().to_hex(), SHA256_EMPTY);
    }

    #[test]
    fn test_blake3_matches_crate() {
        let h = HashAlgorithm::Blake3.digest(b"hello");
        assert_eq!(h.as_bytes(), blake3::hash(b"hello").as_bytes());
    }

    #[test]
    fn test_digest_many_is_concatenation() {
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
            assert_eq!(
                alg.digest_many(&[b"hello ", b"world"]),
                alg.digest(b"hello world")
            );
        }
    }

    #[test]
    fn test_digest_pair_order_matters() {
        let a = HashAlgorithm::Sha256.digest(b"a");
        let b = HashAlgorithm::Sha256.digest(b"b");
        assert_ne!(
            HashAlgorithm::Sha256.digest_pair(&a, &b),
            HashAlgorithm::Sha256.digest_pair(&b, &a)
        );
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let h1 = HashAlgorithm::Sha256.digest(b"test data");
        let h2 = Hash::from_hex(&h1.to_hex()).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(Hash::from_hex("zz"), Err(Error::InvalidHash(_))));
        assert!(matches!(Hash::from_hex("abcd"), Err(Error::InvalidHash(_))));
    }

    #[test]
    fn test_hash_short() {
        let h = HashAlgorithm::Sha256.digest(b"test");
        assert_eq!(h.short().len(), 7);
        assert_eq!(format!("{:?}", h), format!("Hash({})", h.short()));
    }

    #[test]
    fn test_algorithm_serde_names() {
        let json = serde_json::to_string(&HashAlgorithm::Blake3).unwrap();
        assert_eq!(json, "\"blake3\"");
        let alg: HashAlgorithm = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(alg, HashAlgorithm::Sha256);
    }
}
