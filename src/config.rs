//! Per-trie configuration
//!
//! A trie is built from a [`TrieConfig`], which can be created in code or
//! loaded from a JSON file such as:
//!
//! ```json
//! { "algorithm": "blake3", "key_len": 32 }
//! ```

use crate::model::HashAlgorithm;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings fixed for the lifetime of one trie
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieConfig {
    /// Hash function used for leaf and branch digests
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// When set, every inserted key must be exactly this many bytes
    #[serde(default)]
    pub key_len: Option<usize>,
}

impl TrieConfig {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        TrieConfig {
            algorithm,
            key_len: None,
        }
    }

    /// Require every key to be exactly `len` bytes
    pub fn with_key_len(mut self, len: usize) -> Self {
        self.key_len = Some(len);
        self
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_sha256_without_fixed_length() {
        let config = TrieConfig::default();
        assert_eq!(config.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.key_len, None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: TrieConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TrieConfig::default());

        let config: TrieConfig = serde_json::from_str(r#"{"key_len": 4}"#).unwrap();
        assert_eq!(config, TrieConfig::default().with_key_len(4));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trie.json");

        let config = TrieConfig::new(HashAlgorithm::Blake3).with_key_len(32);
        config.save(&path).unwrap();

        assert_eq!(TrieConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_unknown_algorithm() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trie.json");
        std::fs::write(&path, r#"{"algorithm": "md5"}"#).unwrap();

        assert!(matches!(
            TrieConfig::load(&path),
            Err(crate::Error::Json(_))
        ));
    }
}
